//! Typed per-request context stored in request extensions

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::types::ApiError;
use crate::domain::User;

/// Per-request values set by middleware
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    /// Set by the authentication middleware
    pub user: Option<User>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: None,
        }
    }
}

/// Extractor for the user attached by the authentication middleware
///
/// Rejects with `401` when no user is attached.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.user.clone())
            .map(CurrentUser)
            .ok_or_else(ApiError::not_authenticated)
    }
}
