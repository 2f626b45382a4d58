use anyhow::{Context, Result};

const DEFAULT_GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Upper bound on messages listed per pipeline run.
const DEFAULT_MAX_RESULTS: u32 = 100;

/// Largest `maxResults` Gmail accepts on a list call.
const GMAIL_MAX_RESULTS_CAP: u32 = 500;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gmail_client_id: String,
    pub gmail_client_secret: String,
    pub gmail_redirect_uri: String,
    pub gmail_api_base: String,
    pub anthropic_api_key: String,
    pub max_results: u32,
    pub secure_cookies: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gmail_client_id: require_env("GMAIL_CLIENT_ID")?,
            gmail_client_secret: require_env("GMAIL_CLIENT_SECRET")?,
            gmail_redirect_uri: require_env("GMAIL_REDIRECT_URI")?,
            gmail_api_base: std::env::var("GMAIL_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GMAIL_API_BASE.to_string()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            max_results: match std::env::var("MAX_RESULTS") {
                Ok(v) => parse_max_results(&v)?,
                Err(_) => DEFAULT_MAX_RESULTS,
            },
            secure_cookies: std::env::var("SECURE_COOKIES")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses `MAX_RESULTS`: zero is rejected, values above Gmail's cap are clamped.
fn parse_max_results(value: &str) -> Result<u32> {
    let parsed = value
        .trim()
        .parse::<u32>()
        .context("MAX_RESULTS must be a positive integer")?;
    anyhow::ensure!(parsed > 0, "MAX_RESULTS must be a positive integer");
    Ok(parsed.min(GMAIL_MAX_RESULTS_CAP))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for handler and gateway tests.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/screener_test".to_string(),
            gmail_client_id: "client-id".to_string(),
            gmail_client_secret: "client-secret".to_string(),
            gmail_redirect_uri: "http://localhost:8080/api/auth/google".to_string(),
            gmail_api_base: DEFAULT_GMAIL_API_BASE.to_string(),
            anthropic_api_key: "test-key".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            secure_cookies: false,
            port: 8080,
            rust_log: "debug".to_string(),
        }
    }
}
