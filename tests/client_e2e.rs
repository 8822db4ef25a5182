use reqwest::StatusCode;
use time::macros::datetime;
use yoga_studio::{
    app::build_app,
    auth::dto::{LoginRequest, SignupRequest},
    client::{
        guards::{AuthGuard, Navigation, Route, UnauthGuard},
        views::{self, Account, SessionDetail, SessionList},
        ApiClient, ClientError, SessionService,
    },
    seed::{seed_demo_data, ADMIN_EMAIL, ADMIN_PASSWORD},
    sessions::dto::SessionRequest,
    state::AppState,
};

async fn spawn_server() -> String {
    let state = AppState::fake();
    seed_demo_data(state.store.as_ref()).await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, SessionService::new())
}

fn signup(email: &str) -> SignupRequest {
    SignupRequest {
        email: email.into(),
        first_name: "Paul".into(),
        last_name: "Dupont".into(),
        password: "test!1234".into(),
    }
}

fn credentials(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

async fn admin_client(base: &str) -> ApiClient {
    let api = client(base);
    views::login(&api, &credentials(ADMIN_EMAIL, ADMIN_PASSWORD))
        .await
        .unwrap();
    api
}

#[tokio::test]
async fn register_then_login_opens_a_session() {
    let base = spawn_server().await;
    let api = client(&base);
    let auth_guard = AuthGuard::new(api.session().clone());
    let unauth_guard = UnauthGuard::new(api.session().clone());

    assert_eq!(auth_guard.can_activate(), Navigation::Redirect(Route::Login));
    assert_eq!(views::register(&api, &signup("paul@test.com")).await.unwrap(), Route::Login);

    let next = views::login(&api, &credentials("paul@test.com", "test!1234"))
        .await
        .unwrap();
    assert_eq!(next, Route::Sessions);
    assert_eq!(auth_guard.can_activate(), Navigation::Allow);
    assert_eq!(unauth_guard.can_activate(), Navigation::Redirect(Route::Sessions));

    let info = api.session().session_information().unwrap();
    assert_eq!(info.username, "paul@test.com");
    assert_eq!(info.token_type, "Bearer");
    assert!(!info.admin);
}

#[tokio::test]
async fn failed_login_and_duplicate_register_surface_errors() {
    let base = spawn_server().await;
    let api = client(&base);

    let err = views::login(&api, &credentials("inconnu@test.com", "inconnu"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(!api.session().is_logged());

    views::register(&api, &signup("paul@test.com")).await.unwrap();
    match views::register(&api, &signup("paul@test.com")).await {
        Err(ClientError::Http { status, body }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, "Error: Email is already taken!");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn requests_without_session_are_rejected() {
    let base = spawn_server().await;
    let api = client(&base);
    let err = api.sessions().all().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn admin_manages_sessions() {
    let base = spawn_server().await;
    let api = admin_client(&base).await;

    let teachers = api.teachers().all().await.unwrap();
    assert_eq!(teachers.len(), 2);

    let mut request = SessionRequest {
        name: Some("Session yoga matin".into()),
        date: Some(datetime!(2023-12-01 06:00 UTC)),
        teacher_id: Some(teachers[0].id),
        description: Some("Détendu pour la journée".into()),
        users: None,
    };
    let created = views::save_session(&api, None, &request).await.unwrap();
    assert_eq!(created.name, "Session yoga matin");

    let list = SessionList::load(&api).await.unwrap();
    assert!(list.can_manage);
    assert_eq!(list.sessions.len(), 1);

    request.name = Some("Nom session mis à jour".into());
    let updated = views::save_session(&api, Some(created.id), &request).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Nom session mis à jour");

    let detail = SessionDetail::load(&api, created.id).await.unwrap();
    assert_eq!(detail.teacher.as_ref().unwrap().last_name, "DELAHAYE");
    assert_eq!(detail.delete(&api).await.unwrap(), Route::Sessions);

    let err = api.sessions().detail(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn member_joins_and_leaves_a_session() {
    let base = spawn_server().await;
    let admin_api = admin_client(&base).await;
    let teacher = admin_api.teachers().all().await.unwrap().remove(0);
    let created = admin_api
        .sessions()
        .create(&SessionRequest {
            name: Some("Hatha".into()),
            date: Some(datetime!(2024-01-15 18:30 UTC)),
            teacher_id: Some(teacher.id),
            description: Some("Description".into()),
            users: None,
        })
        .await
        .unwrap();

    let api = client(&base);
    views::register(&api, &signup("paul@test.com")).await.unwrap();
    views::login(&api, &credentials("paul@test.com", "test!1234"))
        .await
        .unwrap();

    let list = SessionList::load(&api).await.unwrap();
    assert!(!list.can_manage);

    let mut detail = SessionDetail::load(&api, created.id).await.unwrap();
    assert!(!detail.is_participate);
    assert_eq!(detail.attendees(), 0);

    detail.toggle_participation(&api).await.unwrap();
    assert!(detail.is_participate);
    assert_eq!(detail.attendees(), 1);

    detail.toggle_participation(&api).await.unwrap();
    assert!(!detail.is_participate);
    assert_eq!(detail.attendees(), 0);
}

#[tokio::test]
async fn member_deletes_own_account() {
    let base = spawn_server().await;
    let api = client(&base);
    views::register(&api, &signup("paul@test.com")).await.unwrap();
    views::login(&api, &credentials("paul@test.com", "test!1234"))
        .await
        .unwrap();

    let account = Account::load(&api).await.unwrap();
    assert_eq!(account.user.email, "paul@test.com");
    assert!(account.can_delete());
    assert_eq!(account.delete(&api).await.unwrap(), Route::Home);
    assert!(!api.session().is_logged());

    let err = views::login(&api, &credentials("paul@test.com", "test!1234"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn admin_account_page_hides_delete() {
    let base = spawn_server().await;
    let api = admin_client(&base).await;
    let account = Account::load(&api).await.unwrap();
    assert!(account.user.admin);
    assert!(!account.can_delete());
}
