use super::session::SessionService;

/// Client-side screens the guards redirect between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Sessions,
    Account,
    NotFound,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Sessions => "/sessions",
            Route::Account => "/me",
            Route::NotFound => "/404",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

/// Lets through only logged-in users; everyone else goes to the login page.
#[derive(Clone)]
pub struct AuthGuard {
    session: SessionService,
}

impl AuthGuard {
    pub fn new(session: SessionService) -> Self {
        Self { session }
    }

    pub fn can_activate(&self) -> Navigation {
        if self.session.is_logged() {
            Navigation::Allow
        } else {
            Navigation::Redirect(Route::Login)
        }
    }
}

/// Guards login and register: a logged-in user is sent to the session list.
#[derive(Clone)]
pub struct UnauthGuard {
    session: SessionService,
}

impl UnauthGuard {
    pub fn new(session: SessionService) -> Self {
        Self { session }
    }

    pub fn can_activate(&self) -> Navigation {
        if self.session.is_logged() {
            Navigation::Redirect(Route::Sessions)
        } else {
            Navigation::Allow
        }
    }
}
