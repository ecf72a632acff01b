//! Session storage
//!
//! A session is a small key/value map bound to a named cookie. The store
//! loads it from request headers and renders it back into a `Set-Cookie`
//! header value.

mod cookie_store;

pub use cookie_store::CookieSessionStore;

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::UserId;

#[cfg(test)]
use mockall::automock;

/// Session key holding the authenticated user's id
pub const USER_ID_SESSION_KEY: &str = "user_id";

/// Errors raised by a session store
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to encode session: {0}")]
    Encode(String),

    #[error("Failed to sign session: {0}")]
    Signing(String),
}

/// Key/value state carried across requests
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    name: String,
    values: BTreeMap<String, Value>,
    is_new: bool,
}

impl Session {
    /// Create an empty session that has not been sent to the client yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            is_new: true,
        }
    }

    pub(crate) fn restore(name: impl Into<String>, values: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            values,
            is_new: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Read a typed value; a value of the wrong shape reads as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value).map_err(|e| SessionError::Encode(e.to_string()))?;
        self.values.insert(key.into(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.get::<i64>(USER_ID_SESSION_KEY).map(UserId::new)
    }

    pub fn set_user_id(&mut self, id: UserId) -> Result<(), SessionError> {
        self.insert(USER_ID_SESSION_KEY, id.value())
    }

    pub fn clear_user_id(&mut self) {
        self.remove(USER_ID_SESSION_KEY);
    }
}

/// Session persistence capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Load the named session from request headers, or start a new one
    async fn get(&self, headers: &HeaderMap, name: &str) -> Result<Session, SessionError>;

    /// Persist the session, returning the `Set-Cookie` value for the response
    async fn save(&self, session: &Session) -> Result<HeaderValue, SessionError>;
}
