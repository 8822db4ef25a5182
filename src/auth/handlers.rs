use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{JwtResponse, LoginRequest, SignupRequest},
    jwt::JwtKeys,
    services,
};
use crate::{
    error::{ApiResult, MessageResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    services::register(state.store.as_ref(), req).await?;
    Ok(Json(MessageResponse::new("User registered successfully!")))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<JwtResponse>> {
    let Json(req) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let resp = services::login(state.store.as_ref(), &keys, req).await?;
    Ok(Json(resp))
}
