//! Resume scoring. Asks the LLM for a 1–10 match score and records it.
//!
//! A malformed or out-of-range model answer never fails the pipeline: it is
//! logged as low-confidence and defaults to `MIN_SCORE`.

pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{CallOptions, Completion};
use crate::models::application::{MAX_SCORE, MIN_SCORE};
use crate::scoring::prompts::{build_score_prompt, SCORE_SYSTEM};
use crate::store::ApplicationStore;

/// Short, low-randomness sampling: the answer is a single number.
const SCORE_OPTIONS: CallOptions = CallOptions {
    max_tokens: 4,
    temperature: 0.3,
};

/// Scores a resume against a job description.
///
/// Implementations persist the score for `(job_id, email_id)` before returning it.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        job_id: Uuid,
        email_id: &str,
        resume_text: &str,
        job_description: &str,
    ) -> Result<i32, AppError>;
}

pub struct LlmScorer {
    llm: Arc<dyn Completion>,
    applications: Arc<dyn ApplicationStore>,
}

impl LlmScorer {
    pub fn new(llm: Arc<dyn Completion>, applications: Arc<dyn ApplicationStore>) -> Self {
        Self { llm, applications }
    }
}

#[async_trait]
impl Scorer for LlmScorer {
    async fn score(
        &self,
        job_id: Uuid,
        email_id: &str,
        resume_text: &str,
        job_description: &str,
    ) -> Result<i32, AppError> {
        let prompt = build_score_prompt(resume_text, job_description);
        let raw = self
            .llm
            .complete(&prompt, SCORE_SYSTEM, SCORE_OPTIONS)
            .await
            .map_err(|e| AppError::Llm(format!("Resume scoring failed: {e}")))?;

        let score = match parse_score(&raw) {
            Some(score) => {
                debug!(email_id, score, "Resume scored");
                score
            }
            None => {
                warn!(
                    email_id,
                    response = %raw.trim(),
                    "Low-confidence score: unusable model response, defaulting to {MIN_SCORE}"
                );
                MIN_SCORE
            }
        };

        self.applications
            .record_score(job_id, email_id, score)
            .await?;

        Ok(score)
    }
}

/// Parses the leading integer of a model response.
/// Returns `None` when there is no leading integer or it falls outside 1..=10.
pub fn parse_score(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix(['-', '+']) {
        Some(rest) => (&trimmed[..1], rest),
        None => ("", trimmed),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value: i64 = format!("{sign}{}", &digits[..len]).parse().ok()?;
    i32::try_from(value)
        .ok()
        .filter(|v| (MIN_SCORE..=MAX_SCORE).contains(v))
}
