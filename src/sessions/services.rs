use tracing::{info, warn};

use super::repo_types::{Session, SessionInput};
use crate::{
    error::{ApiError, ApiResult},
    store::Store,
};

/// Drops duplicate and unknown user ids.
async fn normalize_participants(store: &dyn Store, ids: Vec<i64>) -> ApiResult<Vec<i64>> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if out.contains(&id) {
            continue;
        }
        if store.find_user(id).await?.is_some() {
            out.push(id);
        } else {
            warn!(user_id = id, "ignoring unknown participant");
        }
    }
    Ok(out)
}

async fn prepare(store: &dyn Store, mut input: SessionInput) -> ApiResult<SessionInput> {
    if store.find_teacher(input.teacher_id).await?.is_none() {
        return Err(ApiError::bad_request(format!(
            "Unknown teacher: {}",
            input.teacher_id
        )));
    }
    if let Some(users) = input.users.take() {
        input.users = Some(normalize_participants(store, users).await?);
    }
    Ok(input)
}

pub async fn create(store: &dyn Store, input: SessionInput) -> ApiResult<Session> {
    let input = prepare(store, input).await?;
    let session = store.create_session(input).await?;
    info!(session_id = session.id, "session created");
    Ok(session)
}

pub async fn update(store: &dyn Store, id: i64, input: SessionInput) -> ApiResult<Session> {
    if store.find_session(id).await?.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }
    let input = prepare(store, input).await?;
    let session = store
        .update_session(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    info!(session_id = id, "session updated");
    Ok(session)
}

pub async fn delete(store: &dyn Store, id: i64) -> ApiResult<()> {
    if !store.delete_session(id).await? {
        return Err(ApiError::not_found("Session not found"));
    }
    info!(session_id = id, "session deleted");
    Ok(())
}

pub async fn participate(store: &dyn Store, id: i64, user_id: i64) -> ApiResult<()> {
    let session = store
        .find_session(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    if store.find_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    if session.has_participant(user_id) {
        return Err(ApiError::bad_request("User already participates"));
    }
    store.add_participant(id, user_id).await?;
    info!(session_id = id, user_id, "participant added");
    Ok(())
}

pub async fn no_longer_participate(store: &dyn Store, id: i64, user_id: i64) -> ApiResult<()> {
    let session = store
        .find_session(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    if !session.has_participant(user_id) {
        return Err(ApiError::bad_request("User does not participate"));
    }
    store.remove_participant(id, user_id).await?;
    info!(session_id = id, user_id, "participant removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::repo::SessionRepo;
    use crate::store::memory::MemoryStore;
    use crate::teachers::repo::TeacherRepo;
    use crate::users::{repo::UserRepo, repo_types::NewUser};
    use time::macros::datetime;

    struct Fixture {
        store: MemoryStore,
        teacher_id: i64,
        user_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::default();
        let teacher = store.create_teacher("Margot", "DELAHAYE").await.unwrap();
        let user = store
            .create_user(NewUser {
                email: "user@test.com".into(),
                first_name: "Paul".into(),
                last_name: "Dupont".into(),
                password_hash: "x".into(),
                admin: false,
            })
            .await
            .unwrap();
        Fixture {
            store,
            teacher_id: teacher.id,
            user_id: user.id,
        }
    }

    fn input(teacher_id: i64) -> SessionInput {
        SessionInput {
            name: "Cours Yoga matin".into(),
            description: "Hatha".into(),
            date: datetime!(2024-03-01 08:00 UTC),
            teacher_id,
            users: None,
        }
    }

    #[tokio::test]
    async fn create_saves_session() {
        let f = fixture().await;
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();
        assert_eq!(s.name, "Cours Yoga matin");
        assert!(s.users.is_empty());
        assert!(f.store.find_session(s.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_unknown_teacher() {
        let f = fixture().await;
        let err = create(&f.store, input(999)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_dedups_and_filters_participants() {
        let f = fixture().await;
        let mut i = input(f.teacher_id);
        i.users = Some(vec![f.user_id, 404, f.user_id]);
        let s = create(&f.store, i).await.unwrap();
        assert_eq!(s.users, vec![f.user_id]);
    }

    #[tokio::test]
    async fn update_keeps_participants_unless_given() {
        let f = fixture().await;
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();
        participate(&f.store, s.id, f.user_id).await.unwrap();

        let mut i = input(f.teacher_id);
        i.name = "Nom session mis à jour".into();
        let updated = update(&f.store, s.id, i).await.unwrap();
        assert_eq!(updated.name, "Nom session mis à jour");
        assert_eq!(updated.users, vec![f.user_id]);

        let mut i = input(f.teacher_id);
        i.users = Some(vec![]);
        let cleared = update(&f.store, s.id, i).await.unwrap();
        assert!(cleared.users.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_missing_session_are_not_found() {
        let f = fixture().await;
        assert!(matches!(
            update(&f.store, 77, input(f.teacher_id)).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(delete(&f.store, 77).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_allowed_with_participants() {
        let f = fixture().await;
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();
        participate(&f.store, s.id, f.user_id).await.unwrap();
        delete(&f.store, s.id).await.unwrap();
        assert!(f.store.find_session(s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn participate_adds_user_once() {
        let f = fixture().await;
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();

        participate(&f.store, s.id, f.user_id).await.unwrap();
        let s = f.store.find_session(s.id).await.unwrap().unwrap();
        assert!(s.has_participant(f.user_id));

        let err = participate(&f.store, s.id, f.user_id).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn participate_requires_existing_session_and_user() {
        let f = fixture().await;
        assert!(matches!(
            participate(&f.store, 1234, f.user_id).await,
            Err(ApiError::NotFound(_))
        ));
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();
        assert!(matches!(
            participate(&f.store, s.id, 9_999_999).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn leaving_removes_user_and_rejects_non_participants() {
        let f = fixture().await;
        let s = create(&f.store, input(f.teacher_id)).await.unwrap();

        let err = no_longer_participate(&f.store, s.id, f.user_id).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        participate(&f.store, s.id, f.user_id).await.unwrap();
        no_longer_participate(&f.store, s.id, f.user_id).await.unwrap();
        let s = f.store.find_session(s.id).await.unwrap().unwrap();
        assert!(!s.has_participant(f.user_id));

        assert!(matches!(
            no_longer_participate(&f.store, 555, f.user_id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
