use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::TeacherDto;
use crate::{
    auth::extractors::AuthUser,
    error::{parse_id, ApiError, ApiResult},
    state::AppState,
};

pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route("/teacher", get(find_all))
        .route("/teacher/:id", get(find_by_id))
}

#[instrument(skip(state, _caller))]
pub async fn find_all(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<TeacherDto>>> {
    let teachers = state.store.list_teachers().await?;
    Ok(Json(teachers.into_iter().map(TeacherDto::from).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn find_by_id(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TeacherDto>> {
    let id = parse_id(&id)?;
    let teacher = state
        .store
        .find_teacher(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;
    Ok(Json(teacher.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::test_support::{send, TestApp};

    #[tokio::test]
    async fn lists_all_teachers() {
        let app = TestApp::new().await;
        let (status, body) = send(&app.router(), Method::GET, "/api/teacher", Some(&app.user_token), None).await;

        assert_eq!(status, StatusCode::OK);
        let teachers = body.as_array().expect("array");
        assert_eq!(teachers.len(), 2);
        assert_eq!(teachers[0]["lastName"], "DELAHAYE");
        assert_eq!(teachers[1]["lastName"], "THIERCELIN");
    }

    #[tokio::test]
    async fn finds_teacher_by_id() {
        let app = TestApp::new().await;
        let router = app.router();

        let uri = format!("/api/teacher/{}", app.teacher.id);
        let (status, body) = send(&router, Method::GET, &uri, Some(&app.user_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], app.teacher.id);
        assert_eq!(body["firstName"], "Margot");

        let (status, _) = send(&router, Method::GET, "/api/teacher/999", Some(&app.user_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::GET, "/api/teacher/abc", Some(&app.user_token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
