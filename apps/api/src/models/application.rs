use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

/// The persisted outcome of scoring one candidate email against a job.
///
/// Unique per `(job_id, email_id)`; re-processing the same email overwrites the
/// existing row instead of creating a second one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub email_id: String,
    pub applicant_email: String,
    pub job_title: String,
    pub subject_line: String,
    /// Always within `MIN_SCORE..=MAX_SCORE`.
    pub score: i32,
    pub resume_text: String,
    pub timestamp: DateTime<Utc>,
}

impl Application {
    /// A row holding only a score, written before the pipeline stored the resume.
    pub fn is_placeholder(&self) -> bool {
        self.resume_text.is_empty()
    }
}
