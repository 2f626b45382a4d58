//! Axum route handler for the process-emails pipeline.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::auth::session_id_from_headers;
use crate::errors::AppError;
use crate::pipeline::orchestrator::{process_job, ProcessOutcome};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEmailsRequest {
    #[serde(default, alias = "jobId")]
    pub active_job_id: Option<String>,
}

/// POST /api/process-emails
///
/// Scores new applicant emails for the job, or returns its stored applications
/// when nothing new has arrived. A body that is missing or does not decode is
/// treated as a request without a job id.
pub async fn handle_process_emails(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProcessEmailsRequest>, JsonRejection>,
) -> Result<Json<ProcessOutcome>, AppError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected process-emails body: {rejection}");
            ProcessEmailsRequest::default()
        }
    };

    let session_id = session_id_from_headers(&headers);
    let outcome = process_job(
        &state.pipeline(),
        session_id.as_deref(),
        request.active_job_id.as_deref(),
    )
    .await?;
    Ok(Json(outcome))
}
