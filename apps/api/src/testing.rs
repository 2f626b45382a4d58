//! Test doubles for the mail, extraction and scoring seams.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::ResumeExtractor;
use crate::mail::{MailError, MailGateway, MailSession, MessageMetadata};
use crate::scoring::Scorer;

struct FakeMessage {
    id: String,
    from: String,
    subject: Option<String>,
    body: String,
}

/// In-memory mailbox. Messages start unread; `mark_read` removes them from the unread set.
#[derive(Default)]
pub struct FakeMailbox {
    messages: Vec<FakeMessage>,
    unread: Mutex<Vec<String>>,
    fail_content: HashSet<String>,
    fail_mark_read: HashSet<String>,
    fail_list: bool,
    reject_auth: bool,
    pub queries: Mutex<Vec<(String, u32)>>,
    marked: Mutex<Vec<String>>,
    auth_calls: Mutex<u32>,
}

impl FakeMailbox {
    pub fn with_message(mut self, id: &str, from: &str, subject: Option<&str>, body: &str) -> Self {
        self.messages.push(FakeMessage {
            id: id.to_string(),
            from: from.to_string(),
            subject: subject.map(str::to_string),
            body: body.to_string(),
        });
        self.unread.lock().unwrap().push(id.to_string());
        self
    }

    pub fn failing_content(mut self, id: &str) -> Self {
        self.fail_content.insert(id.to_string());
        self
    }

    pub fn failing_mark_read(mut self, id: &str) -> Self {
        self.fail_mark_read.insert(id.to_string());
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    pub fn marked_read(&self) -> Vec<String> {
        self.marked.lock().unwrap().clone()
    }

    pub fn auth_calls(&self) -> u32 {
        *self.auth_calls.lock().unwrap()
    }

    pub fn reset_unread(&self) {
        *self.unread.lock().unwrap() = self.messages.iter().map(|m| m.id.clone()).collect();
    }

    fn message(&self, id: &str) -> Result<&FakeMessage, MailError> {
        self.messages
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| MailError::Api {
                status: 404,
                message: format!("message {id} not found"),
            })
    }
}

fn unavailable(what: &str) -> MailError {
    MailError::Api {
        status: 503,
        message: format!("{what} unavailable"),
    }
}

#[async_trait]
impl MailGateway for FakeMailbox {
    async fn authenticate(&self, _session_id: &str) -> Result<MailSession, MailError> {
        *self.auth_calls.lock().unwrap() += 1;
        if self.reject_auth {
            return Err(MailError::NoCredential);
        }
        Ok(MailSession {
            access_token: SecretString::from("test-token".to_string()),
        })
    }

    async fn list_unread(
        &self,
        _session: &MailSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<String>, MailError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if self.fail_list {
            return Err(unavailable("list"));
        }
        let unread = self.unread.lock().unwrap();
        Ok(unread.iter().take(limit as usize).cloned().collect())
    }

    async fn get_content(
        &self,
        _session: &MailSession,
        message_id: &str,
    ) -> Result<Vec<u8>, MailError> {
        if self.fail_content.contains(message_id) {
            return Err(unavailable("content"));
        }
        Ok(self.message(message_id)?.body.as_bytes().to_vec())
    }

    async fn get_metadata(
        &self,
        _session: &MailSession,
        message_id: &str,
    ) -> Result<MessageMetadata, MailError> {
        let message = self.message(message_id)?;
        let mut headers = vec![("From", message.from.as_str())];
        if let Some(subject) = &message.subject {
            headers.push(("Subject", subject.as_str()));
        }
        Ok(MessageMetadata::from_headers(headers))
    }

    async fn mark_read(&self, _session: &MailSession, message_id: &str) -> Result<(), MailError> {
        if self.fail_mark_read.contains(message_id) {
            return Err(unavailable("modify"));
        }
        self.unread.lock().unwrap().retain(|id| id != message_id);
        self.marked.lock().unwrap().push(message_id.to_string());
        Ok(())
    }
}

/// Treats the raw message bytes as the resume text; blank input is an extraction failure.
pub struct FakeExtractor;

#[async_trait]
impl ResumeExtractor for FakeExtractor {
    async fn extract(&self, raw_message: Vec<u8>) -> Result<String, AppError> {
        let text = String::from_utf8(raw_message)
            .map_err(|e| AppError::Extraction(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(AppError::Extraction("empty message".to_string()));
        }
        Ok(text)
    }
}

/// Returns a fixed score and records `(email_id, resume_text, job_description)` per call.
pub struct ScriptedScorer {
    score: i32,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedScorer {
    pub fn new(score: i32) -> Self {
        Self {
            score,
            calls: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Scorer for ScriptedScorer {
    async fn score(
        &self,
        _job_id: Uuid,
        email_id: &str,
        resume_text: &str,
        job_description: &str,
    ) -> Result<i32, AppError> {
        self.calls.lock().unwrap().push((
            email_id.to_string(),
            resume_text.to_string(),
            job_description.to_string(),
        ));
        Ok(self.score)
    }
}
