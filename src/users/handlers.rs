use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::UserDto;
use crate::{
    auth::extractors::AuthUser,
    error::{parse_id, ApiError, ApiResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/:id", get(find_by_id).delete(delete_account))
}

#[instrument(skip(state, _caller))]
pub async fn find_by_id(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserDto>> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Accounts can only be deleted by their owner.
#[instrument(skip(state, caller))]
pub async fn delete_account(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.email != caller.email {
        warn!(caller_id = caller.id, target_id = id, "refused to delete foreign account");
        return Err(ApiError::unauthorized("Cannot delete another account"));
    }

    state.store.delete_user(id).await?;
    info!(user_id = id, "account deleted");
    Ok(StatusCode::OK)
}
