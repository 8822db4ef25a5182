use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// A scheduled yoga class with its participant ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub teacher_id: i64,
    pub users: Vec<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Session {
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }
}

/// `sessions` table row; participants live in `participate`.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub teacher_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SessionRow {
    pub fn with_users(self, users: Vec<i64>) -> Session {
        Session {
            id: self.id,
            name: self.name,
            description: self.description,
            date: self.date,
            teacher_id: self.teacher_id,
            users,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Validated fields of a create or update.
#[derive(Debug, Clone)]
pub struct SessionInput {
    pub name: String,
    pub description: String,
    pub date: OffsetDateTime,
    pub teacher_id: i64,
    /// `None` on update keeps the current participants.
    pub users: Option<Vec<i64>>,
}
