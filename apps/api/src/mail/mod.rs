//! Mail gateway: mailbox access for a browser session.
//!
//! `MailGateway` is the seam the pipeline talks to. `GmailGateway` implements it
//! over the Gmail REST API; OAuth credential handling lives in `oauth` and
//! `session`.

pub mod gmail;
pub mod oauth;
pub mod session;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::errors::AppError;

pub use gmail::GmailGateway;
pub use oauth::{GoogleOAuth, TokenRefresher, TokenResponse};

pub const UNKNOWN_SENDER: &str = "Unknown sender";
pub const NO_SUBJECT: &str = "No subject";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("No tokens found for this session")]
    NoCredential,

    #[error("Failed to refresh access token. Please authenticate again. ({0})")]
    RefreshFailed(String),

    #[error("Mail provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from mail provider: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::NoCredential | MailError::RefreshFailed(_) => {
                AppError::Unauthorized(err.to_string())
            }
            MailError::Api { status: 401, .. } => AppError::Unauthorized(err.to_string()),
            MailError::Store(inner) => inner,
            MailError::Http(_) | MailError::Api { .. } | MailError::Malformed(_) => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}

/// An authenticated mailbox handle. Only valid for the duration of one request.
pub struct MailSession {
    pub access_token: SecretString,
}

/// Sender and subject of a message, with sentinels substituted for missing headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetadata {
    pub from: String,
    pub subject: String,
}

impl MessageMetadata {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut from = None;
        let mut subject = None;
        for (name, value) in headers {
            if from.is_none() && name.eq_ignore_ascii_case("From") {
                from = Some(value.to_string());
            } else if subject.is_none() && name.eq_ignore_ascii_case("Subject") {
                subject = Some(value.to_string());
            }
        }
        Self {
            from: from.unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            subject: subject.unwrap_or_else(|| NO_SUBJECT.to_string()),
        }
    }
}

#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Loads the session's credential, refreshing it first if it has expired.
    async fn authenticate(&self, session_id: &str) -> Result<MailSession, MailError>;

    /// Message ids matching `query`, at most `limit`, in provider order.
    async fn list_unread(
        &self,
        session: &MailSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<String>, MailError>;

    /// Full RFC 822 bytes of a message.
    async fn get_content(&self, session: &MailSession, message_id: &str)
        -> Result<Vec<u8>, MailError>;

    async fn get_metadata(
        &self,
        session: &MailSession,
        message_id: &str,
    ) -> Result<MessageMetadata, MailError>;

    async fn mark_read(&self, session: &MailSession, message_id: &str) -> Result<(), MailError>;
}

/// Search query for unread messages whose subject mentions `title`.
///
/// Gmail subject search is case-insensitive, so one query covers every casing.
pub fn unread_subject_query(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| *c != '"').collect();
    format!("subject:(\"{}\") is:unread", cleaned.trim())
}
