use async_trait::async_trait;

use super::repo_types::{NewUser, User};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user(&self, id: i64) -> anyhow::Result<Option<User>>;

    /// Emails are stored lowercased; callers pass the normalized form.
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn create_user(&self, new_user: NewUser) -> anyhow::Result<User>;

    /// Also drops the user from every session they joined. Returns false when
    /// no such user existed.
    async fn delete_user(&self, id: i64) -> anyhow::Result<bool>;
}
