//! Screen-level flows that sit between the access services and whatever
//! renders them: login, register, session detail, session form and account.
//! Login state is the one held by the [`ApiClient`], so guards built from
//! `api.session()` and the bearer header always agree.

use tracing::info;

use super::{
    api::ApiClient,
    guards::Route,
    session::{SessionInformation, SessionService},
    ClientError, ClientResult,
};
use crate::{
    auth::dto::{LoginRequest, SignupRequest},
    sessions::dto::{SessionDto, SessionRequest},
    teachers::dto::TeacherDto,
    users::dto::UserDto,
};

/// Opens a session and tells where to go next.
pub async fn login(api: &ApiClient, request: &LoginRequest) -> ClientResult<Route> {
    let info = api.auth().login(request).await?;
    api.session().log_in(info);
    Ok(Route::Sessions)
}

pub async fn register(api: &ApiClient, request: &SignupRequest) -> ClientResult<Route> {
    api.auth().register(request).await?;
    Ok(Route::Login)
}

pub fn logout(api: &ApiClient) -> Route {
    api.session().log_out();
    Route::Home
}

/// The session list; only admins get the create and edit actions.
pub struct SessionList {
    pub sessions: Vec<SessionDto>,
    pub can_manage: bool,
}

impl SessionList {
    pub async fn load(api: &ApiClient) -> ClientResult<Self> {
        let sessions = api.sessions().all().await?;
        let can_manage = api.session().session_information().is_some_and(|s| s.admin);
        Ok(Self { sessions, can_manage })
    }
}

/// One session as seen by the logged-in user.
#[derive(Debug, Clone)]
pub struct SessionDetail {
    pub session: SessionDto,
    pub teacher: Option<TeacherDto>,
    pub is_participate: bool,
    pub is_admin: bool,
    user_id: i64,
}

impl SessionDetail {
    pub fn new(session: SessionDto, teacher: Option<TeacherDto>, me: &SessionInformation) -> Self {
        Self {
            is_participate: session.users.contains(&me.id),
            is_admin: me.admin,
            user_id: me.id,
            session,
            teacher,
        }
    }

    pub async fn load(api: &ApiClient, id: i64) -> ClientResult<Self> {
        let me = logged_user(api.session())?;
        let dto = api.sessions().detail(id).await?;
        let teacher = api.teachers().detail(dto.teacher_id).await?;
        Ok(Self::new(dto, Some(teacher), &me))
    }

    pub fn attendees(&self) -> usize {
        self.session.users.len()
    }

    /// Joins or leaves, then re-reads the session so the attendee count is
    /// the server's.
    pub async fn toggle_participation(&mut self, api: &ApiClient) -> ClientResult<()> {
        let sessions = api.sessions();
        if self.is_participate {
            sessions.un_participate(self.session.id, self.user_id).await?;
        } else {
            sessions.participate(self.session.id, self.user_id).await?;
        }
        self.refresh(api).await
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> ClientResult<()> {
        self.session = api.sessions().detail(self.session.id).await?;
        self.is_participate = self.session.users.contains(&self.user_id);
        Ok(())
    }

    pub async fn delete(self, api: &ApiClient) -> ClientResult<Route> {
        if !self.is_admin {
            return Err(ClientError::NotAllowed("only admins can delete sessions"));
        }
        api.sessions().delete(self.session.id).await?;
        info!(session_id = self.session.id, "session deleted");
        Ok(Route::Sessions)
    }
}

/// Create when `id` is `None`, update otherwise.
pub async fn save_session(
    api: &ApiClient,
    id: Option<i64>,
    request: &SessionRequest,
) -> ClientResult<SessionDto> {
    match id {
        Some(id) => api.sessions().update(id, request).await,
        None => api.sessions().create(request).await,
    }
}

/// The "me" page.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: UserDto,
}

impl Account {
    pub async fn load(api: &ApiClient) -> ClientResult<Self> {
        let me = logged_user(api.session())?;
        let user = api.users().get_by_id(me.id).await?;
        Ok(Self { user })
    }

    /// Admin accounts cannot be deleted from this page.
    pub fn can_delete(&self) -> bool {
        !self.user.admin
    }

    pub async fn delete(self, api: &ApiClient) -> ClientResult<Route> {
        if !self.can_delete() {
            return Err(ClientError::NotAllowed("admin accounts cannot be deleted"));
        }
        api.users().delete(self.user.id).await?;
        info!(user_id = self.user.id, "account deleted");
        api.session().log_out();
        Ok(Route::Home)
    }
}

fn logged_user(session: &SessionService) -> ClientResult<SessionInformation> {
    session
        .session_information()
        .ok_or(ClientError::NotAllowed("not logged in"))
}
