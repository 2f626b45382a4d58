use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::mail::{GoogleOAuth, MailGateway};
use crate::pipeline::orchestrator::PipelineContext;
use crate::scoring::Scorer;
use crate::store::{ApplicationStore, JobStore, TokenStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub mail: Arc<dyn MailGateway>,
    /// Consent-URL and code-exchange half of the OAuth flow. Refresh goes through `mail`.
    pub oauth: Arc<GoogleOAuth>,
    pub extractor: Arc<dyn ResumeExtractor>,
    pub scorer: Arc<dyn Scorer>,
    pub config: Config,
}

impl AppState {
    /// Borrows the collaborators for one pipeline run.
    pub fn pipeline(&self) -> PipelineContext<'_> {
        PipelineContext {
            jobs: self.jobs.as_ref(),
            applications: self.applications.as_ref(),
            mail: self.mail.as_ref(),
            extractor: self.extractor.as_ref(),
            scorer: self.scorer.as_ref(),
            max_results: self.config.max_results,
        }
    }
}
