use reqwest::{Method, Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{
    interceptor::JwtInterceptor,
    session::{SessionInformation, SessionService},
    ClientError, ClientResult,
};
use crate::{
    auth::dto::{LoginRequest, SignupRequest},
    error::MessageResponse,
    sessions::dto::{SessionDto, SessionRequest},
    teachers::dto::TeacherDto,
    users::dto::UserDto,
};

/// Base HTTP plumbing shared by the resource services. Every request goes
/// through the [`JwtInterceptor`], which reads the same [`SessionService`]
/// that [`ApiClient::session`] hands out.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionService,
    interceptor: JwtInterceptor,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>, session: SessionService) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interceptor: JwtInterceptor::new(session.clone()),
            session,
        }
    }

    pub fn session(&self) -> &SessionService {
        &self.session
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi { client: self.clone() }
    }

    pub fn sessions(&self) -> SessionApi {
        SessionApi { client: self.clone() }
    }

    pub fn teachers(&self) -> TeacherApi {
        TeacherApi { client: self.clone() }
    }

    pub fn users(&self) -> UserApi {
        UserApi { client: self.clone() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn build<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Request> {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(self.interceptor.intercept(builder.build()?))
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let request = self.build(method.clone(), path, body)?;
        let response = self.http.execute(request).await?;

        let status = response.status();
        debug!(%method, path, %status, "api call");
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<MessageResponse>(&text)
            .map(|m| m.message)
            .unwrap_or(text);
        Err(ClientError::Http { status, body })
    }

    async fn json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self.execute(method, path, body).await?.json::<T>().await?)
    }

    async fn empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        self.execute(method, path, body).await?;
        Ok(())
    }
}

const NO_BODY: Option<&()> = None;

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    const PATH: &'static str = "api/auth";

    pub async fn register(&self, request: &SignupRequest) -> ClientResult<()> {
        let path = format!("{}/register", Self::PATH);
        self.client.empty(Method::POST, &path, Some(request)).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<SessionInformation> {
        let path = format!("{}/login", Self::PATH);
        self.client.json(Method::POST, &path, Some(request)).await
    }
}

#[derive(Clone)]
pub struct SessionApi {
    client: ApiClient,
}

impl SessionApi {
    const PATH: &'static str = "api/session";

    pub async fn all(&self) -> ClientResult<Vec<SessionDto>> {
        self.client.json(Method::GET, Self::PATH, NO_BODY).await
    }

    pub async fn detail(&self, id: i64) -> ClientResult<SessionDto> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.json(Method::GET, &path, NO_BODY).await
    }

    pub async fn create(&self, session: &SessionRequest) -> ClientResult<SessionDto> {
        self.client.json(Method::POST, Self::PATH, Some(session)).await
    }

    pub async fn update(&self, id: i64, session: &SessionRequest) -> ClientResult<SessionDto> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.json(Method::PUT, &path, Some(session)).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.empty(Method::DELETE, &path, NO_BODY).await
    }

    pub async fn participate(&self, id: i64, user_id: i64) -> ClientResult<()> {
        let path = format!("{}/{id}/participate/{user_id}", Self::PATH);
        self.client.empty(Method::POST, &path, NO_BODY).await
    }

    pub async fn un_participate(&self, id: i64, user_id: i64) -> ClientResult<()> {
        let path = format!("{}/{id}/participate/{user_id}", Self::PATH);
        self.client.empty(Method::DELETE, &path, NO_BODY).await
    }
}

#[derive(Clone)]
pub struct TeacherApi {
    client: ApiClient,
}

impl TeacherApi {
    const PATH: &'static str = "api/teacher";

    pub async fn all(&self) -> ClientResult<Vec<TeacherDto>> {
        self.client.json(Method::GET, Self::PATH, NO_BODY).await
    }

    pub async fn detail(&self, id: i64) -> ClientResult<TeacherDto> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.json(Method::GET, &path, NO_BODY).await
    }
}

#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    const PATH: &'static str = "api/user";

    pub async fn get_by_id(&self, id: i64) -> ClientResult<UserDto> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.json(Method::GET, &path, NO_BODY).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let path = format!("{}/{id}", Self::PATH);
        self.client.empty(Method::DELETE, &path, NO_BODY).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;
    use crate::client::session::tests::info;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/", SessionService::new());
        assert_eq!(client.url("api/session"), "http://localhost:8080/api/session");
    }

    #[test]
    fn requests_follow_the_client_session() {
        let client = ApiClient::new("http://localhost:8080", SessionService::new());
        let req = client.build(Method::GET, SessionApi::PATH, NO_BODY).unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());

        client.session().log_in(info(4, false));
        let req = client.build(Method::GET, SessionApi::PATH, NO_BODY).unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer token-4");
    }
}
