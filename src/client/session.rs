use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Identity returned by a successful login. Kept in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInformation {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

/// Shared login state. Clones observe the same session; it changes only
/// through [`SessionService::log_in`] and [`SessionService::log_out`].
#[derive(Clone)]
pub struct SessionService {
    tx: Arc<watch::Sender<Option<SessionInformation>>>,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionService {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_logged(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn session_information(&self) -> Option<SessionInformation> {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.token.clone())
    }

    pub fn log_in(&self, info: SessionInformation) {
        debug!(user_id = info.id, "session opened");
        self.tx.send_replace(Some(info));
    }

    pub fn log_out(&self) {
        let closed = self.tx.send_if_modified(|current| current.take().is_some());
        if closed {
            debug!("session closed");
        }
    }

    pub fn watch_logged(&self) -> LoggedWatch {
        LoggedWatch {
            rx: self.tx.subscribe(),
            seen_current: false,
        }
    }
}

/// Stream of the logged-in flag: the current value first, then each change.
pub struct LoggedWatch {
    rx: watch::Receiver<Option<SessionInformation>>,
    seen_current: bool,
}

impl LoggedWatch {
    /// `None` once every [`SessionService`] clone is gone.
    pub async fn next(&mut self) -> Option<bool> {
        if !self.seen_current {
            self.seen_current = true;
            return Some(self.rx.borrow_and_update().is_some());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().is_some())
    }
}
