use super::found;
use crate::{gateway::GatewayState, Error};
use axum::{
    extract::{Extension, Query},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginParams {
    /// Local path to return to after login. Anything else falls back to the landing page.
    pub return_to: Option<String>,
}

#[utoipa::path(
    get,
    path = "/login",
    params(LoginParams),
    responses(
        (status = 302, description = "Redirect to the identity provider authorization endpoint"),
        (status = 503, description = "Too many logins in progress"),
        (status = 500, description = "Login could not be initiated")
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<GatewayState>>,
    Query(params): Query<LoginParams>,
) -> Result<Response, Error> {
    let redirect = state.flow().begin_login(params.return_to.as_deref()).await?;
    Ok(found(redirect.authorization_url.as_str(), None))
}
