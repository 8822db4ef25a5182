use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{SessionDto, SessionRequest},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{parse_id, ApiError, ApiResult},
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(find_all).post(create))
        .route(
            "/session/:id",
            get(find_by_id).put(update).delete(delete_session),
        )
        .route(
            "/session/:id/participate/:user_id",
            post(participate).delete(no_longer_participate),
        )
}

#[instrument(skip(state, _caller))]
pub async fn find_all(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<SessionDto>>> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(sessions.into_iter().map(SessionDto::from).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn find_by_id(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionDto>> {
    let id = parse_id(&id)?;
    let session = state
        .store
        .find_session(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(session.into()))
}

#[instrument(skip(state, _caller, payload))]
pub async fn create(
    State(state): State<AppState>,
    _caller: AuthUser,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<SessionDto>> {
    let Json(req) = payload?;
    let session = services::create(state.store.as_ref(), req.validate()?).await?;
    Ok(Json(session.into()))
}

#[instrument(skip(state, _caller, payload))]
pub async fn update(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<SessionDto>> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let session = services::update(state.store.as_ref(), id, req.validate()?).await?;
    Ok(Json(session.into()))
}

#[instrument(skip(state, _caller))]
pub async fn delete_session(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    services::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::OK)
}

/// Members enroll themselves; admins may enroll anyone.
fn ensure_may_act_for(caller: &AuthUser, user_id: i64) -> ApiResult<()> {
    if caller.admin || caller.id == user_id {
        Ok(())
    } else {
        warn!(caller_id = caller.id, user_id, "participation change for another user");
        Err(ApiError::unauthorized("Cannot change another user's participation"))
    }
}

#[instrument(skip(state, caller))]
pub async fn participate(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let (id, user_id) = (parse_id(&id)?, parse_id(&user_id)?);
    ensure_may_act_for(&caller, user_id)?;
    services::participate(state.store.as_ref(), id, user_id).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, caller))]
pub async fn no_longer_participate(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let (id, user_id) = (parse_id(&id)?, parse_id(&user_id)?);
    ensure_may_act_for(&caller, user_id)?;
    services::no_longer_participate(state.store.as_ref(), id, user_id).await?;
    Ok(StatusCode::OK)
}
