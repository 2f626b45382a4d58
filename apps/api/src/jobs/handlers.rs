//! Axum route handlers for jobs and their stored applications.

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub email_id: Option<String>,
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let title = request.title.trim();
    let description = request.description.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if description.is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let job = state.jobs.create(title, description).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.jobs.list().await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job = state
        .jobs
        .find(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/jobs/:id/applications
///
/// Stored applications for the job, newest first.
pub async fn handle_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    if state.jobs.find(job_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    Ok(Json(state.applications.list_for_job(job_id).await?))
}

/// GET /api/download-resume?emailId=…
///
/// Serves the stored resume text as a plain-text attachment.
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Query(params): Query<DownloadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email_id = params
        .email_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("emailId is required".to_string()))?;

    let application = state
        .applications
        .find_by_email_id(&email_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No resume stored for email {email_id}")))?;

    let headers = [
        (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"resume-{}.txt\"",
                safe_file_stem(&email_id)
            ),
        ),
    ];
    Ok((headers, application.resume_text))
}

fn safe_file_stem(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
