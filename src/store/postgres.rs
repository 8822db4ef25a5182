use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use crate::{
    sessions::{
        repo::SessionRepo,
        repo_types::{Session, SessionInput, SessionRow},
    },
    teachers::{repo::TeacherRepo, repo_types::Teacher},
    users::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, admin, password_hash, created_at, updated_at";
const TEACHER_COLUMNS: &str = "id, first_name, last_name, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, name, description, date, teacher_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    /// Connects and applies pending migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        Ok(Self { db })
    }

    async fn participants(&self, session_id: i64) -> anyhow::Result<Vec<i64>> {
        let rows = sqlx::query_as::<_, (i64,)>(
            r#"SELECT user_id FROM participate WHERE session_id = $1 ORDER BY user_id"#,
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await
        .context("list participants")?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

async fn replace_participants_tx(
    tx: &mut Transaction<'_, Postgres>,
    session_id: i64,
    users: &[i64],
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM participate WHERE session_id = $1"#)
        .bind(session_id)
        .execute(&mut **tx)
        .await
        .context("clear participants")?;
    sqlx::query(
        r#"
        INSERT INTO participate (session_id, user_id)
        SELECT $1, unnest($2::bigint[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(session_id)
    .bind(users.to_vec())
    .execute(&mut **tx)
    .await
    .context("insert participants")?;
    Ok(())
}

async fn participants_tx(
    tx: &mut Transaction<'_, Postgres>,
    session_id: i64,
) -> anyhow::Result<Vec<i64>> {
    let rows = sqlx::query_as::<_, (i64,)>(
        r#"SELECT user_id FROM participate WHERE session_id = $1 ORDER BY user_id"#,
    )
    .bind(session_id)
    .fetch_all(&mut **tx)
    .await
    .context("list participants")?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, admin, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.admin)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        // participate rows go with the user (ON DELETE CASCADE)
        let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl TeacherRepo for PgStore {
    async fn list_teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        let rows = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await
        .context("list teachers")?;
        Ok(rows)
    }

    async fn find_teacher(&self, id: i64) -> anyhow::Result<Option<Teacher>> {
        let row = sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find teacher")?;
        Ok(row)
    }

    async fn create_teacher(&self, first_name: &str, last_name: &str) -> anyhow::Result<Teacher> {
        let row = sqlx::query_as::<_, Teacher>(&format!(
            "INSERT INTO teachers (first_name, last_name) VALUES ($1, $2) RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.db)
        .await
        .context("insert teacher")?;
        Ok(row)
    }
}

#[async_trait]
impl SessionRepo for PgStore {
    async fn list_sessions(&self) -> anyhow::Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY id"
        ))
        .fetch_all(&self.db)
        .await
        .context("list sessions")?;

        let pairs = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT session_id, user_id FROM participate ORDER BY session_id, user_id"#,
        )
        .fetch_all(&self.db)
        .await
        .context("list participations")?;

        let mut by_session: HashMap<i64, Vec<i64>> = HashMap::new();
        for (session_id, user_id) in pairs {
            by_session.entry(session_id).or_default().push(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|r| {
                let users = by_session.remove(&r.id).unwrap_or_default();
                r.with_users(users)
            })
            .collect())
    }

    async fn find_session(&self, id: i64) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find session")?;

        match row {
            Some(r) => {
                let users = self.participants(r.id).await?;
                Ok(Some(r.with_users(users)))
            }
            None => Ok(None),
        }
    }

    async fn create_session(&self, input: SessionInput) -> anyhow::Result<Session> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (name, description, date, teacher_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.teacher_id)
        .fetch_one(&mut *tx)
        .await
        .context("insert session")?;

        let users = input.users.unwrap_or_default();
        if !users.is_empty() {
            replace_participants_tx(&mut tx, row.id, &users).await?;
        }
        let users = participants_tx(&mut tx, row.id).await?;
        tx.commit().await.context("commit tx")?;
        Ok(row.with_users(users))
    }

    async fn update_session(&self, id: i64, input: SessionInput) -> anyhow::Result<Option<Session>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            UPDATE sessions
               SET name = $2, description = $3, date = $4, teacher_id = $5, updated_at = now()
             WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.teacher_id)
        .fetch_optional(&mut *tx)
        .await
        .context("update session")?;

        let Some(row) = row else {
            return Ok(None);
        };
        if let Some(users) = &input.users {
            replace_participants_tx(&mut tx, id, users).await?;
        }
        let users = participants_tx(&mut tx, id).await?;
        tx.commit().await.context("commit tx")?;
        Ok(Some(row.with_users(users)))
    }

    async fn delete_session(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM sessions WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete session")?;
        Ok(res.rows_affected() > 0)
    }

    async fn add_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query(
            r#"
            INSERT INTO participate (session_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("insert participation")?;
        sqlx::query(r#"UPDATE sessions SET updated_at = now() WHERE id = $1"#)
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .context("touch session")?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn remove_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query(r#"DELETE FROM participate WHERE session_id = $1 AND user_id = $2"#)
            .bind(session_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete participation")?;
        sqlx::query(r#"UPDATE sessions SET updated_at = now() WHERE id = $1"#)
            .bind(session_id)
            .execute(&mut *tx)
            .await
            .context("touch session")?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}
