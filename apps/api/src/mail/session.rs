//! Mail-session acquisition: credential lookup plus synchronous refresh.

use secrecy::SecretString;
use tracing::{info, warn};

use super::{MailError, MailSession, TokenRefresher};
use crate::store::TokenStore;

/// Loads the credential for `session_id` and returns a usable session.
///
/// An expired credential is refreshed exactly once and persisted before the
/// session is returned. Refresh failure is never retried; the caller must
/// re-authenticate.
pub async fn acquire_session(
    tokens: &dyn TokenStore,
    refresher: &dyn TokenRefresher,
    session_id: &str,
) -> Result<MailSession, MailError> {
    let credential = tokens
        .find(session_id)
        .await?
        .ok_or(MailError::NoCredential)?;

    if !credential.is_expired() {
        return Ok(MailSession {
            access_token: SecretString::from(credential.access_token),
        });
    }

    info!("Access token expired, refreshing");
    let refresh_token = credential
        .refresh_token
        .clone()
        .ok_or_else(|| MailError::RefreshFailed("no refresh token stored".to_string()))?;

    let response = refresher
        .refresh(&SecretString::from(refresh_token))
        .await
        .map_err(|e| MailError::RefreshFailed(e.to_string()))?;

    let refreshed = response.into_credential(session_id, credential.refresh_token);
    if !tokens.update(&refreshed).await? {
        warn!("No stored credential was updated after refresh");
    }

    Ok(MailSession {
        access_token: SecretString::from(refreshed.access_token),
    })
}
