use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::macros::datetime;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::{jwt::JwtKeys, password::hash_password},
    config::AppConfig,
    sessions::repo_types::{Session, SessionInput},
    state::AppState,
    store::{memory::MemoryStore, Store},
    teachers::repo_types::Teacher,
    users::repo_types::{NewUser, User},
};

pub const PASSWORD: &str = "test!1234";

/// A seeded in-memory application: two teachers, one admin, one member.
pub struct TestApp {
    pub state: AppState,
    pub admin: User,
    pub user: User,
    pub teacher: Teacher,
    pub admin_token: String,
    pub user_token: String,
}

async fn add_user(store: &dyn Store, email: &str, first: &str, last: &str, admin: bool) -> User {
    store
        .create_user(NewUser {
            email: email.into(),
            first_name: first.into(),
            last_name: last.into(),
            password_hash: hash_password(PASSWORD).unwrap(),
            admin,
        })
        .await
        .unwrap()
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        let store: Arc<dyn Store> = Arc::new(MemoryStore::default());

        let teacher = store.create_teacher("Margot", "DELAHAYE").await.unwrap();
        store.create_teacher("Hélène", "THIERCELIN").await.unwrap();
        let admin = add_user(store.as_ref(), "yoga@studio.com", "Admin", "Admin", true).await;
        let user = add_user(store.as_ref(), "user@test.com", "Paul", "Dupont", false).await;

        let keys = JwtKeys::from(&config.jwt);
        let admin_token = keys.sign(admin.id, &admin.email).unwrap();
        let user_token = keys.sign(user.id, &user.email).unwrap();

        Self {
            state: AppState::from_parts(store, config),
            admin,
            user,
            teacher,
            admin_token,
            user_token,
        }
    }

    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    pub async fn create_session(&self, name: &str) -> Session {
        self.state
            .store
            .create_session(SessionInput {
                name: name.into(),
                description: "Description".into(),
                date: datetime!(2024-01-15 18:30 UTC),
                teacher_id: self.teacher.id,
                users: None,
            })
            .await
            .unwrap()
    }
}

/// Runs one request through the router and decodes the JSON body
/// (`Value::Null` when empty).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
