use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::{session_cookie, session_id_from_headers};
use crate::errors::AppError;
use crate::state::AppState;

const AUTH_ERROR_REDIRECT: &str = "/?auth=error";

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
}

/// GET /api/auth/google
///
/// Without `code`: redirects to Google's consent screen.
/// With `code`: stores the exchanged tokens under a new session and sets the session cookie.
pub async fn handle_google_auth(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackQuery>,
) -> Response {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return match state.oauth.consent_url() {
            Ok(url) => Redirect::to(&url).into_response(),
            Err(e) => {
                error!("Error generating auth URL: {e}");
                Redirect::to(AUTH_ERROR_REDIRECT).into_response()
            }
        };
    };

    match complete_login(&state, &code).await {
        Ok(session_id) => {
            let cookie = session_cookie(&session_id, state.config.secure_cookies);
            ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(e) => {
            error!("Error getting tokens: {e}");
            Redirect::to(AUTH_ERROR_REDIRECT).into_response()
        }
    }
}

async fn complete_login(state: &AppState, code: &str) -> Result<String, AppError> {
    let tokens = state.oauth.exchange_code(code).await?;
    let session_id = Uuid::new_v4().to_string();
    let credential = tokens.into_credential(&session_id, None);
    state.tokens.save(&credential).await?;
    info!("Credential stored for new session");
    Ok(session_id)
}

/// GET /api/auth/check
pub async fn handle_auth_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let authenticated = match session_id_from_headers(&headers) {
        Some(session_id) => state.tokens.find(&session_id).await?.is_some(),
        None => false,
    };

    if authenticated {
        Ok((StatusCode::OK, Json(json!({ "isAuthenticated": true }))))
    } else {
        Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "isAuthenticated": false,
                "error": "Session or stored credential missing"
            })),
        ))
    }
}
