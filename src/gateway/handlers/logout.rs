use super::found;
use crate::gateway::{
    cookies::{clear_session_cookie, extract_session_id},
    GatewayState,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 302, description = "Session cleared; redirect to the identity provider logout endpoint"),
        (status = 500, description = "Session cleared, but the logout URL could not be built", body = String)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<GatewayState>>) -> Response {
    let session_id = extract_session_id(&headers);
    let result = state.flow().logout(session_id.as_ref()).await;

    // Always clear the cookie, even if there was no session.
    let cookie = clear_session_cookie(state.session_cookie_secure()).ok();

    match result {
        Ok(location) => found(location.as_str(), cookie),
        Err(err) => {
            let mut response = err.into_response();
            if let Some(cookie) = cookie {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            response
        }
    }
}
