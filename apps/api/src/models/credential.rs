use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Seconds before the recorded expiry at which a token is already treated as stale.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Stored OAuth token set for one browser session. One active credential per session.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Credential {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Checks if the access token is expired (or expires within `EXPIRY_BUFFER_SECS`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::seconds(EXPIRY_BUFFER_SECS)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
