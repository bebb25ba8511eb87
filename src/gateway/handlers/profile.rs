use crate::{gateway::guard::CurrentUser, idp::UserClaims};
use axum::response::Json;

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Claims of the authenticated user", body = UserClaims),
        (status = 302, description = "No session; redirect to /login")
    ),
    tag = "auth"
)]
// Only claims are rendered; tokens stay in the session store.
pub async fn profile(user: CurrentUser) -> Json<UserClaims> {
    Json(user.claims)
}
