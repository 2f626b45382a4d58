//! Google OAuth2 authorization-code flow and token refresh.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use super::MailError;
use crate::models::credential::Credential;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Mailbox scopes requested at consent time.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.send",
];

/// Access-token lifetime assumed when the provider omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;
const MAX_EXPIRES_IN_SECS: u64 = 365 * 24 * 3600;

/// Maximum length for error bodies carried into logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Lifetime in seconds of the access token.
    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Only returned on the first exchange and on rotation.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Builds the stored credential for `session_id`, keeping `previous_refresh`
    /// when the provider did not rotate the refresh token.
    pub fn into_credential(
        self,
        session_id: &str,
        previous_refresh: Option<String>,
    ) -> Credential {
        let lifetime = self
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
            .min(MAX_EXPIRES_IN_SECS);
        Credential {
            session_id: session_id.to_string(),
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now() + chrono::Duration::seconds(lifetime as i64),
        }
    }
}

/// Exchanges a refresh token for a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, MailError>;
}

/// OAuth2 client for Google accounts.
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

impl GoogleOAuth {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            client_id,
            client_secret: SecretString::from(client_secret),
            redirect_uri,
        })
    }

    /// URL of Google's consent screen, requesting offline access so a refresh token is issued.
    pub fn consent_url(&self) -> Result<String, MailError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| MailError::Malformed(format!("Invalid consent URL: {e}")))?;
        Ok(url.into())
    }

    /// Exchanges an authorization code from the consent redirect for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, MailError> {
        info!("Exchanging authorization code for tokens");
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        self.token_request(&params).await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, MailError> {
        let response = self.client.post(TOKEN_URL).form(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: sanitize_error_body(&body),
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| MailError::Malformed(format!("Failed to parse token response: {e}")))
    }
}

#[async_trait]
impl TokenRefresher for GoogleOAuth {
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, MailError> {
        info!("Refreshing access token");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("refresh_token", refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
        ];
        self.token_request(&params).await
    }
}

/// Truncates provider error bodies so token material never floods the logs.
pub(crate) fn sanitize_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{head}... (truncated)")
    } else {
        body.to_string()
    }
}
