//! Gmail REST implementation of `MailGateway`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::oauth::sanitize_error_body;
use super::session::acquire_session;
use super::{MailError, MailGateway, MailSession, MessageMetadata, TokenRefresher};
use crate::store::TokenStore;

/// Gmail's `raw` field is base64url; padding varies, so accept either form.
const RAW_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ListResponse {
    /// Absent when nothing matches.
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct MetadataMessage {
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

pub struct GmailGateway {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl GmailGateway {
    pub fn new(
        base_url: String,
        tokens: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Result<Self, MailError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            refresher,
        })
    }

    fn messages_url(&self, suffix: &str) -> String {
        format!("{}/messages{suffix}", self.base_url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: &MailSession,
    ) -> Result<T, MailError> {
        let response = send(request, session).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| MailError::Malformed(e.to_string()))
    }
}

async fn send(request: RequestBuilder, session: &MailSession) -> Result<Response, MailError> {
    let response = request
        .bearer_auth(session.access_token.expose_secret())
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MailError::Api {
        status: status.as_u16(),
        message: sanitize_error_body(&body),
    })
}

fn decode_raw(raw: &str) -> Result<Vec<u8>, MailError> {
    RAW_ENGINE
        .decode(raw.trim())
        .map_err(|e| MailError::Malformed(format!("raw message is not base64url: {e}")))
}

fn metadata_from_message(message: &MetadataMessage) -> MessageMetadata {
    let headers = message
        .payload
        .as_ref()
        .map(|p| p.headers.as_slice())
        .unwrap_or_default();
    MessageMetadata::from_headers(headers.iter().map(|h| (h.name.as_str(), h.value.as_str())))
}

#[async_trait]
impl MailGateway for GmailGateway {
    async fn authenticate(&self, session_id: &str) -> Result<MailSession, MailError> {
        acquire_session(self.tokens.as_ref(), self.refresher.as_ref(), session_id).await
    }

    async fn list_unread(
        &self,
        session: &MailSession,
        query: &str,
        limit: u32,
    ) -> Result<Vec<String>, MailError> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.messages_url(""))
            .query(&[("q", query), ("maxResults", limit.as_str())]);
        let list: ListResponse = self.send_json(request, session).await?;
        debug!(count = list.messages.len(), "Listed unread messages");
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn get_content(
        &self,
        session: &MailSession,
        message_id: &str,
    ) -> Result<Vec<u8>, MailError> {
        let request = self
            .client
            .get(self.messages_url(&format!("/{message_id}")))
            .query(&[("format", "raw")]);
        let message: RawMessage = self.send_json(request, session).await?;
        decode_raw(&message.raw)
    }

    async fn get_metadata(
        &self,
        session: &MailSession,
        message_id: &str,
    ) -> Result<MessageMetadata, MailError> {
        let request = self
            .client
            .get(self.messages_url(&format!("/{message_id}")))
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Subject"),
            ]);
        let message: MetadataMessage = self.send_json(request, session).await?;
        Ok(metadata_from_message(&message))
    }

    async fn mark_read(&self, session: &MailSession, message_id: &str) -> Result<(), MailError> {
        let request = self
            .client
            .post(self.messages_url(&format!("/{message_id}/modify")))
            .json(&json!({ "removeLabelIds": ["UNREAD"] }));
        send(request, session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{NO_SUBJECT, UNKNOWN_SENDER};

    #[test]
    fn test_list_response_without_messages_is_empty() {
        let list: ListResponse = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(list.messages.is_empty());
    }

    #[test]
    fn test_list_response_keeps_provider_order() {
        let list: ListResponse = serde_json::from_str(
            r#"{"messages": [{"id": "b", "threadId": "t1"}, {"id": "a", "threadId": "t2"}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = list.messages.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_decode_raw_accepts_padded_and_unpadded() {
        let unpadded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"Subject: hi\r\n");
        let padded = base64::engine::general_purpose::URL_SAFE.encode(b"Subject: hi\r\n");
        assert_eq!(decode_raw(&unpadded).unwrap(), b"Subject: hi\r\n");
        assert_eq!(decode_raw(&padded).unwrap(), b"Subject: hi\r\n");
    }

    #[test]
    fn test_decode_raw_rejects_garbage() {
        assert!(matches!(
            decode_raw("!!not base64!!"),
            Err(MailError::Malformed(_))
        ));
    }

    #[test]
    fn test_metadata_message_without_subject_header() {
        let message: MetadataMessage = serde_json::from_str(
            r#"{"id": "m1", "payload": {"headers": [{"name": "From", "value": "ada@example.com"}]}}"#,
        )
        .unwrap();
        let meta = metadata_from_message(&message);
        assert_eq!(meta.from, "ada@example.com");
        assert_eq!(meta.subject, NO_SUBJECT);
    }

    #[test]
    fn test_metadata_message_without_payload() {
        let message: MetadataMessage = serde_json::from_str(r#"{"id": "m1"}"#).unwrap();
        let meta = metadata_from_message(&message);
        assert_eq!(meta.from, UNKNOWN_SENDER);
        assert_eq!(meta.subject, NO_SUBJECT);
    }
}
