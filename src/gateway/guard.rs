//! Access guard for protected routes.
//!
//! Apply with `route_layer(middleware::from_fn(require_session))`. Handlers
//! behind it receive the caller through the [`CurrentUser`] extractor.

use super::{cookies::extract_session_id, handlers::found, GatewayState};
use crate::{idp::UserClaims, session::SessionId};
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;

/// The authenticated caller of a guarded request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub session_id: SessionId,
    pub claims: UserClaims,
}

/// Resolve the session cookie or redirect to `/login`.
///
/// The inner handler is never invoked without a live session.
pub async fn require_session(
    Extension(state): Extension<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match extract_session_id(request.headers()) {
        Some(session_id) => state.flow().resolve(&session_id).await,
        None => None,
    };

    let Some(session) = session else {
        let target = request
            .uri()
            .path_and_query()
            .map_or("/", |path_and_query| path_and_query.as_str());
        debug!("No session, redirecting to login");
        return found(&login_location(target), None);
    };

    request.extensions_mut().insert(CurrentUser {
        session_id: session.id,
        claims: session.claims,
    });

    next.run(request).await
}

/// `/login?return_to=<target>`
pub(crate) fn login_location(target: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("return_to", target)
        .finish();
    format!("/login?{query}")
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Self>() {
            Some(user) => Ok(user.clone()),
            None => {
                let target = parts
                    .uri
                    .path_and_query()
                    .map_or("/", |path_and_query| path_and_query.as_str());
                Err(found(&login_location(target), None))
            }
        }
    }
}
