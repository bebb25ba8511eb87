use super::found;
use crate::{
    auth::CallbackParams,
    gateway::{
        cookies::{extract_session_id, session_cookie},
        GatewayState,
    },
    Error,
};
use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

#[utoipa::path(
    get,
    path = "/callback",
    params(CallbackParams),
    responses(
        (status = 302, description = "Session created; redirect to the original page with the session cookie"),
        (status = 400, description = "Unknown, expired or missing state, or missing code", body = String),
        (status = 403, description = "Identity provider denied the authorization", body = String),
        (status = 502, description = "Identity provider rejected the exchange or was unreachable", body = String),
        (status = 500, description = "Session could not be created", body = String)
    ),
    tag = "auth"
)]
pub async fn callback(
    headers: HeaderMap,
    state: Extension<Arc<GatewayState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, Error> {
    let completed = state.flow().complete_login(params).await?;

    // The new cookie replaces any session this browser already had.
    if let Some(previous) = extract_session_id(&headers) {
        if previous != completed.session_id {
            state.flow().sessions().destroy(&previous).await;
            debug!("Replaced previous session");
        }
    }

    let cookie = match session_cookie(
        &completed.session_id,
        state.config().session_ttl(),
        state.session_cookie_secure(),
    ) {
        Ok(cookie) => cookie,
        Err(err) => {
            // Without a cookie the session is unreachable.
            state.flow().sessions().destroy(&completed.session_id).await;
            error!("Failed to build session cookie: {err}");
            return Err(Error::SessionStore("failed to build session cookie".to_string()));
        }
    };

    Ok(found(&completed.redirect_to, Some(cookie)))
}
