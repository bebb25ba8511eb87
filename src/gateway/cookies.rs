//! `Set-Cookie` construction and `Cookie` parsing for the session identifier.

use crate::session::SessionId;
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use std::time::Duration;

pub const SESSION_COOKIE_NAME: &str = "authgate_session";

/// Build the `HttpOnly` session cookie. The value is the opaque identifier only.
pub fn session_cookie(
    session_id: &SessionId,
    max_age: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = max_age.as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}",
        session_id.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session identifier out of the `Cookie` header(s).
#[must_use]
pub fn extract_session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            let val = val.trim();
            (key.trim() == SESSION_COOKIE_NAME && !val.is_empty())
                .then(|| SessionId::new(val))
        })
}
