//! Application state shared by handlers and middleware

use std::sync::Arc;

use crate::domain::{PasswordHasher, UserRepository};
use crate::infrastructure::session::SessionStore;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sessions: Arc<dyn SessionStore>,
    /// Name of the session cookie
    pub session_name: Arc<str>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        sessions: Arc<dyn SessionStore>,
        session_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
            session_name: session_name.into(),
        }
    }
}
