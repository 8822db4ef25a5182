use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    sessions::{
        repo::SessionRepo,
        repo_types::{Session, SessionInput},
    },
    teachers::{repo::TeacherRepo, repo_types::Teacher},
    users::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
};

/// Process-local store used by tests and database-less runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    teachers: BTreeMap<i64, Teacher>,
    sessions: BTreeMap<i64, Session>,
    last_user_id: i64,
    last_teacher_id: i64,
    last_session_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

// Participants are kept in id order, as the SQL store returns them.
fn sorted(mut users: Vec<i64>) -> Vec<i64> {
    users.sort_unstable();
    users.dedup();
    users
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> anyhow::Result<User> {
        let mut tables = self.inner.write().await;
        if tables.users.values().any(|u| u.email == new_user.email) {
            anyhow::bail!("email {} already registered", new_user.email);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: next(&mut tables.last_user_id),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            admin: new_user.admin,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.inner.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        for session in tables.sessions.values_mut() {
            session.users.retain(|u| *u != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl TeacherRepo for MemoryStore {
    async fn list_teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        Ok(self.inner.read().await.teachers.values().cloned().collect())
    }

    async fn find_teacher(&self, id: i64) -> anyhow::Result<Option<Teacher>> {
        Ok(self.inner.read().await.teachers.get(&id).cloned())
    }

    async fn create_teacher(&self, first_name: &str, last_name: &str) -> anyhow::Result<Teacher> {
        let mut tables = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let teacher = Teacher {
            id: next(&mut tables.last_teacher_id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.teachers.insert(teacher.id, teacher.clone());
        Ok(teacher)
    }
}

#[async_trait]
impl SessionRepo for MemoryStore {
    async fn list_sessions(&self) -> anyhow::Result<Vec<Session>> {
        Ok(self.inner.read().await.sessions.values().cloned().collect())
    }

    async fn find_session(&self, id: i64) -> anyhow::Result<Option<Session>> {
        Ok(self.inner.read().await.sessions.get(&id).cloned())
    }

    async fn create_session(&self, input: SessionInput) -> anyhow::Result<Session> {
        let mut tables = self.inner.write().await;
        let now = OffsetDateTime::now_utc();
        let session = Session {
            id: next(&mut tables.last_session_id),
            name: input.name,
            description: input.description,
            date: input.date,
            teacher_id: input.teacher_id,
            users: sorted(input.users.unwrap_or_default()),
            created_at: now,
            updated_at: now,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_session(&self, id: i64, input: SessionInput) -> anyhow::Result<Option<Session>> {
        let mut tables = self.inner.write().await;
        let Some(session) = tables.sessions.get_mut(&id) else {
            return Ok(None);
        };
        session.name = input.name;
        session.description = input.description;
        session.date = input.date;
        session.teacher_id = input.teacher_id;
        if let Some(users) = input.users {
            session.users = sorted(users);
        }
        session.updated_at = OffsetDateTime::now_utc();
        Ok(Some(session.clone()))
    }

    async fn delete_session(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.sessions.remove(&id).is_some())
    }

    async fn add_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()> {
        let mut tables = self.inner.write().await;
        let session = tables
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| anyhow::anyhow!("session {session_id} vanished"))?;
        if !session.users.contains(&user_id) {
            session.users.push(user_id);
            session.users.sort_unstable();
            session.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn remove_participant(&self, session_id: i64, user_id: i64) -> anyhow::Result<()> {
        let mut tables = self.inner.write().await;
        if let Some(session) = tables.sessions.get_mut(&session_id) {
            session.users.retain(|u| *u != user_id);
            session.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }
}
