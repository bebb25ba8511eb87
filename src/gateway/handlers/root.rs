use crate::gateway::{cookies::extract_session_id, GatewayState};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Root {
    name: String,
    version: String,
    authenticated: bool,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner and whether the caller has a session", body = Root)
    ),
    tag = "authgate"
)]
pub async fn root(headers: HeaderMap, state: Extension<Arc<GatewayState>>) -> Json<Root> {
    let authenticated = match extract_session_id(&headers) {
        Some(session_id) => state.flow().sessions().get(&session_id).await.is_some(),
        None => false,
    };

    Json(Root {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        authenticated,
    })
}
