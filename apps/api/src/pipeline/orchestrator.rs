//! Process-emails orchestration.
//!
//! Flow: resolve job → acquire mail session → list unread matches →
//!       per email (content → metadata → extract → score → upsert → mark read).
//!
//! Emails are handled one at a time. A failure inside one email is logged and
//! that email is skipped; it stays unread and is picked up on the next run.
//! Only job resolution, session acquisition and the list call can fail the run.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::ResumeExtractor;
use crate::mail::{unread_subject_query, MailGateway, MailSession};
use crate::models::application::Application;
use crate::models::job::Job;
use crate::scoring::Scorer;
use crate::store::{ApplicationStore, JobStore};

pub const PROCESSED_MESSAGE: &str = "Emails processed successfully";
pub const FALLBACK_MESSAGE: &str = "No new emails found. Showing previous applicants.";

/// Collaborators for one pipeline run, borrowed from `AppState`.
pub struct PipelineContext<'a> {
    pub jobs: &'a dyn JobStore,
    pub applications: &'a dyn ApplicationStore,
    pub mail: &'a dyn MailGateway,
    pub extractor: &'a dyn ResumeExtractor,
    pub scorer: &'a dyn Scorer,
    pub max_results: u32,
}

/// Result payload of a pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub message: String,
    /// Applications produced by this run, or the stored ones on fallback.
    pub processed_emails: Vec<Application>,
}

/// A per-email failure tagged with the stage it happened in.
#[derive(Debug)]
struct EmailFailure {
    stage: &'static str,
    error: AppError,
}

trait AtStage<T> {
    fn at(self, stage: &'static str) -> Result<T, EmailFailure>;
}

impl<T, E: Into<AppError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: &'static str) -> Result<T, EmailFailure> {
        self.map_err(|e| EmailFailure {
            stage,
            error: e.into(),
        })
    }
}

/// Validates the raw job id supplied by the caller.
pub fn parse_job_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("No active job ID provided".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid job ID '{raw}'")))
}

/// Runs the pipeline for one job on behalf of the caller's mail session.
pub async fn process_job(
    ctx: &PipelineContext<'_>,
    session_id: Option<&str>,
    raw_job_id: Option<&str>,
) -> Result<ProcessOutcome, AppError> {
    let job_id = parse_job_id(raw_job_id)?;
    run_job(ctx, session_id, job_id)
        .instrument(info_span!("process_job", %job_id))
        .await
}

async fn run_job(
    ctx: &PipelineContext<'_>,
    session_id: Option<&str>,
    job_id: Uuid,
) -> Result<ProcessOutcome, AppError> {
    // Step 1: Resolve job
    let job = ctx
        .jobs
        .find(job_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No job description found for the provided ID".to_string())
        })?;

    // Step 2: Mail session (refreshes the token if needed)
    let session_id = session_id
        .ok_or_else(|| AppError::Unauthorized("No session ID found".to_string()))?;
    let session = ctx.mail.authenticate(session_id).await?;

    // Step 3: Unread candidates
    let query = unread_subject_query(&job.title);
    let message_ids = ctx
        .mail
        .list_unread(&session, &query, ctx.max_results)
        .await?;
    info!(count = message_ids.len(), "Found new emails matching the job title");

    // Step 4: Nothing new, so show the existing pipeline state
    if message_ids.is_empty() {
        let previous = ctx.applications.list_for_job(job.id).await?;
        info!(count = previous.len(), "No new emails, returning previous applicants");
        return Ok(ProcessOutcome {
            message: FALLBACK_MESSAGE.to_string(),
            processed_emails: previous,
        });
    }

    // Step 5: Each email in isolation
    let mut processed = Vec::with_capacity(message_ids.len());
    for message_id in &message_ids {
        let outcome = process_email(ctx, &session, &job, message_id)
            .instrument(info_span!("email", email_id = %message_id))
            .await;
        match outcome {
            Ok(application) => processed.push(application),
            Err(failure) => error!(
                email_id = %message_id,
                stage = failure.stage,
                error = %failure.error,
                "Error processing email, skipping"
            ),
        }
    }

    info!(
        processed = processed.len(),
        skipped = message_ids.len() - processed.len(),
        "Pipeline run finished"
    );

    Ok(ProcessOutcome {
        message: PROCESSED_MESSAGE.to_string(),
        processed_emails: processed,
    })
}

async fn process_email(
    ctx: &PipelineContext<'_>,
    session: &MailSession,
    job: &Job,
    message_id: &str,
) -> Result<Application, EmailFailure> {
    let raw = ctx.mail.get_content(session, message_id).await.at("content")?;
    let metadata = ctx
        .mail
        .get_metadata(session, message_id)
        .await
        .at("metadata")?;
    let resume_text = ctx.extractor.extract(raw).await.at("extraction")?;

    let score = ctx
        .scorer
        .score(job.id, message_id, &resume_text, &job.description)
        .await
        .at("scoring")?;
    info!(score, "Email scored");

    let application = Application {
        application_id: Uuid::new_v4(),
        job_id: job.id,
        email_id: message_id.to_string(),
        applicant_email: metadata.from,
        job_title: job.title.clone(),
        subject_line: metadata.subject,
        score,
        resume_text,
        timestamp: Utc::now(),
    };
    let stored = ctx
        .applications
        .upsert(&application)
        .await
        .at("persistence")?;

    ctx.mail.mark_read(session, message_id).await.at("mark_read")?;

    Ok(stored)
}
