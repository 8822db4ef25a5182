use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::Teacher;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Teacher> for TeacherDto {
    fn from(t: Teacher) -> Self {
        Self {
            id: t.id,
            last_name: t.last_name,
            first_name: t.first_name,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
