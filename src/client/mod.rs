//! HTTP client for the studio API: the logged-in session holder, navigation
//! guards, bearer-token attachment and one access service per resource.

use reqwest::StatusCode;
use thiserror::Error;

pub mod api;
pub mod guards;
pub mod interceptor;
pub mod session;
pub mod views;

pub use api::ApiClient;
pub use session::{SessionInformation, SessionService};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer. `body` is the server's `message` when it sent one.
    #[error("request failed with {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    NotAllowed(&'static str),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            ClientError::NotAllowed(_) => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
