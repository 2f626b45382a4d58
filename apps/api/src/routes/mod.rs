pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/google", get(auth::handle_google_auth))
        .route("/api/auth/check", get(auth::handle_auth_check))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/jobs/:id/applications",
            get(jobs::handle_job_applications),
        )
        .route("/api/download-resume", get(jobs::handle_download_resume))
        // Pipeline
        .route(
            "/api/process-emails",
            post(pipeline::handle_process_emails),
        )
        .with_state(state)
}
