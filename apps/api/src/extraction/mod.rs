//! Resume extraction: turns a raw RFC 822 message into plain resume text.
//!
//! Preference order: first PDF attachment, then first `text/plain` attachment,
//! then the message body itself. A PDF without extractable text is skipped in
//! favour of the next source.

use async_trait::async_trait;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::{debug, warn};

use crate::errors::AppError;

#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, raw_message: Vec<u8>) -> Result<String, AppError>;
}

/// Default extractor backed by `mail-parser` and `pdf-extract`.
pub struct MimeResumeExtractor;

#[async_trait]
impl ResumeExtractor for MimeResumeExtractor {
    async fn extract(&self, raw_message: Vec<u8>) -> Result<String, AppError> {
        // PDF text extraction is CPU-bound; keep it off the request workers.
        tokio::task::spawn_blocking(move || extract_resume_text(&raw_message))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))?
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Source {
    Pdf,
    TextAttachment,
    Body,
}

pub fn extract_resume_text(raw_message: &[u8]) -> Result<String, AppError> {
    let message = MessageParser::default()
        .parse(raw_message)
        .ok_or_else(|| AppError::Extraction("Failed to parse email message".to_string()))?;

    let (source, text) = pick_source(&message);
    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::Extraction(
            "Message contains no resume text".to_string(),
        ));
    }

    debug!(?source, chars = text.len(), "Extracted resume text");
    Ok(text)
}

fn pick_source(message: &Message<'_>) -> (Source, String) {
    let attachments: Vec<&MessagePart<'_>> = message.attachments().collect();

    if let Some(pdf) = attachments.iter().find(|p| is_pdf(p)) {
        match pdf_extract::extract_text_from_mem(pdf.contents()) {
            Ok(text) if !text.trim().is_empty() => return (Source::Pdf, text),
            Ok(_) => warn!("PDF attachment has no text layer, trying other parts"),
            Err(e) => warn!(error = %e, "Unreadable PDF attachment, trying other parts"),
        }
    }

    if let Some(text) = attachments.iter().find_map(|p| match &p.body {
        PartType::Text(text) => Some(text.to_string()),
        _ => None,
    }) {
        return (Source::TextAttachment, text);
    }

    // body_text converts an HTML-only body to plain text.
    let body = message
        .body_text(0)
        .map(|b| b.into_owned())
        .unwrap_or_default();
    (Source::Body, body)
}

fn is_pdf(part: &MessagePart<'_>) -> bool {
    let by_type = part
        .content_type()
        .map(|ct| {
            ct.ctype().eq_ignore_ascii_case("application")
                && ct
                    .subtype()
                    .is_some_and(|s| s.eq_ignore_ascii_case("pdf"))
        })
        .unwrap_or(false);
    let by_name = part
        .attachment_name()
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
    by_type || by_name
}

/// Collapses runs of spaces and blank lines; keeps single line breaks.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
