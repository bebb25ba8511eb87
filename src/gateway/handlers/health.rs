use crate::{gateway::GatewayState, GIT_COMMIT_HASH};
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    name: String,
    version: String,
    build: String,
    /// Live sessions held in memory.
    sessions: usize,
    /// Logins waiting for their callback.
    pending_logins: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Gateway is up", body = Health)
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health(Extension(state): Extension<Arc<GatewayState>>) -> impl IntoResponse {
    let flow = state.flow();
    let health = Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: GIT_COMMIT_HASH.to_string(),
        sessions: flow.sessions().len().await,
        pending_logins: flow.pending().len().await,
    };

    let mut headers = HeaderMap::new();
    match x_app(&health.name, &health.version, &health.build).parse::<HeaderValue>() {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => error!("Failed to parse X-App header: {}", err),
    }

    (headers, Json(health))
}

/// `name:version:short-hash`, with an empty hash outside git builds.
fn x_app(name: &str, version: &str, build: &str) -> String {
    let short_hash = build.get(..7).filter(|_| build.len() > 7).unwrap_or("");
    format!("{name}:{version}:{short_hash}")
}
