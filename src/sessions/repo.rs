use async_trait::async_trait;

use super::repo_types::{Session, SessionInput};

#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// Ordered by id.
    async fn list_sessions(&self) -> anyhow::Result<Vec<Session>>;

    async fn find_session(&self, id: i64) -> anyhow::Result<Option<Session>>;

    async fn create_session(&self, input: SessionInput) -> anyhow::Result<Session>;

    async fn update_session(&self, id: i64, input: SessionInput) -> anyhow::Result<Option<Session>>;

    async fn delete_session(&self, id: i64) -> anyhow::Result<bool>;

    /// Idempotent at the storage level; duplicate checks belong to the caller.
    async fn add_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()>;

    async fn remove_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()>;
}
