use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Request,
};
use tracing::warn;

use super::session::SessionService;

/// Adds `Authorization: Bearer <token>` to outgoing requests while a session
/// is open. Without one, requests pass through untouched.
#[derive(Clone)]
pub struct JwtInterceptor {
    session: SessionService,
}

impl JwtInterceptor {
    pub fn new(session: SessionService) -> Self {
        Self { session }
    }

    pub fn intercept(&self, mut request: Request) -> Request {
        let Some(token) = self.session.token() else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("session token is not a valid header value; sending without it"),
        }
        request
    }
}
