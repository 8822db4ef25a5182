use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339,
    macros::{datetime, format_description},
    Date, OffsetDateTime, UtcOffset,
};

use super::repo_types::{Session, SessionInput};
use crate::error::{ApiError, ApiResult};

const NAME_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 2500;
// RFC 3339 output and the database both stop at four-digit years.
const EARLIEST_DATE: OffsetDateTime = datetime!(0000-01-01 0:00 UTC);
const LATEST_DATE: OffsetDateTime = datetime!(9999-12-31 23:59:59.999_999_999 UTC);

/// Session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "teacher_id")]
    pub teacher_id: i64,
    pub description: String,
    pub users: Vec<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            name: s.name,
            date: s.date,
            teacher_id: s.teacher_id,
            description: s.description,
            users: s.users,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Body of POST /session and PUT /session/:id.
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, with = "flexible_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<OffsetDateTime>,
    #[serde(default, rename = "teacher_id", skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<i64>>,
}

impl SessionRequest {
    pub fn validate(self) -> ApiResult<SessionInput> {
        let mut problems = Vec::new();

        let name = self.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            problems.push("name is required".to_string());
        } else if name.chars().count() > NAME_MAX {
            problems.push(format!("name must be at most {NAME_MAX} characters"));
        }

        let description = self.description.unwrap_or_default().trim().to_string();
        if description.is_empty() {
            problems.push("description is required".to_string());
        } else if description.chars().count() > DESCRIPTION_MAX {
            problems.push(format!("description must be at most {DESCRIPTION_MAX} characters"));
        }

        let date = match self.date {
            None => {
                problems.push("date is required".to_string());
                None
            }
            Some(d) if d < EARLIEST_DATE || d > LATEST_DATE => {
                problems.push("date is invalid".to_string());
                None
            }
            Some(d) => Some(d.to_offset(UtcOffset::UTC)),
        };
        if self.teacher_id.is_none() {
            problems.push("teacher_id is required".to_string());
        }

        match (date, self.teacher_id) {
            (Some(date), Some(teacher_id)) if problems.is_empty() => Ok(SessionInput {
                name,
                description,
                date,
                teacher_id,
                users: self.users,
            }),
            _ => Err(ApiError::BadRequest(problems.join("; "))),
        }
    }
}

/// Accepts RFC 3339 instants and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_session_date(raw: &str) -> Result<OffsetDateTime, String> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(dt);
    }
    let day = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &day)
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| format!("invalid date: {raw}"))
}

mod flexible_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    pub fn serialize<S: Serializer>(value: &Option<OffsetDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => {
                let text = v.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|r| super::parse_session_date(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}
