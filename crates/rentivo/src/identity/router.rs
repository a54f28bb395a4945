use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::domain::{AuthenticatedUser, Credentials, Registration, UserView};
use crate::access::Principal;
use crate::http::{ApiResult, ApiState, JsonBody};

pub fn identity_router() -> Router<ApiState> {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(current_user_handler))
}

pub(crate) async fn register_handler(
    State(state): State<ApiState>,
    JsonBody(registration): JsonBody<Registration>,
) -> ApiResult<(StatusCode, Json<AuthenticatedUser>)> {
    let authenticated = state.identity.register(registration)?;
    Ok((StatusCode::CREATED, Json(authenticated)))
}

pub(crate) async fn login_handler(
    State(state): State<ApiState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult<Json<AuthenticatedUser>> {
    Ok(Json(state.identity.login(credentials)?))
}

pub(crate) async fn current_user_handler(
    State(state): State<ApiState>,
    principal: Principal,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.identity.current_user(&principal)?))
}
