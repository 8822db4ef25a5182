use async_trait::async_trait;

use super::repo_types::Teacher;

#[async_trait]
pub trait TeacherRepo: Send + Sync {
    async fn list_teachers(&self) -> anyhow::Result<Vec<Teacher>>;

    async fn find_teacher(&self, id: i64) -> anyhow::Result<Option<Teacher>>;

    async fn create_teacher(&self, first_name: &str, last_name: &str) -> anyhow::Result<Teacher>;
}
