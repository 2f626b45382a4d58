//! Browser session handling: the `session_id` cookie and the Google OAuth routes.

pub mod handlers;

use axum::http::{header::COOKIE, HeaderMap};

pub const SESSION_COOKIE: &str = "session_id";

/// 30 days.
const SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Reads the session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to `session_id`.
pub fn session_cookie(session_id: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={session_id}; Max-Age={SESSION_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
