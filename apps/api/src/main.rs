mod auth;
mod config;
mod db;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod mail;
mod models;
mod pipeline;
mod routes;
mod scoring;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{close_pool, create_pool};
use crate::extraction::MimeResumeExtractor;
use crate::llm_client::{Completion, LlmClient};
use crate::mail::{GmailGateway, GoogleOAuth};
use crate::routes::build_router;
use crate::scoring::LlmScorer;
use crate::state::AppState;
use crate::store::{ApplicationStore, PgApplicationStore, PgJobStore, PgTokenStore, TokenStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let tokens: Arc<dyn TokenStore> = Arc::new(PgTokenStore::new(db.clone()));
    let applications: Arc<dyn ApplicationStore> = Arc::new(PgApplicationStore::new(db.clone()));

    // Initialize Gmail access
    let oauth = Arc::new(GoogleOAuth::new(
        config.gmail_client_id.clone(),
        config.gmail_client_secret.clone(),
        config.gmail_redirect_uri.clone(),
    )?);
    let mail = GmailGateway::new(config.gmail_api_base.clone(), tokens.clone(), oauth.clone())?;
    info!("Gmail gateway initialized ({})", config.gmail_api_base);

    // Initialize LLM client
    let llm: Arc<dyn Completion> = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        jobs: Arc::new(PgJobStore::new(db.clone())),
        applications: applications.clone(),
        tokens,
        mail: Arc::new(mail),
        oauth,
        extractor: Arc::new(MimeResumeExtractor),
        scorer: Arc::new(LlmScorer::new(llm, applications)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(&db).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
