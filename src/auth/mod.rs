/// Authentication and authorization
///
/// Sessions resolve bearer tokens to user ids; the guard is the one place
/// that decides whether a caller may touch an entity.

pub mod guard;
pub mod session;

pub use guard::{Guard, Owned};
pub use session::{Session, SessionStore};

/// Identity attached to an incoming request
///
/// A caller without a user id is unauthenticated. Reads return empty results
/// for such callers; writes fail with `NotAuthenticated`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()) }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
