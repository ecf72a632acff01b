//! API error type and `{"error": "..."}` response body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::DomainError;
use crate::infrastructure::session::SessionError;

pub const INCORRECT_CREDENTIALS_MESSAGE: &str = "incorrect user email or password";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "user is not authenticated";
pub const EMPTY_BODY_MESSAGE: &str = "server expected a non empty input body, but got null";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// What went wrong, independent of the status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    MalformedBody,
    Validation,
    NotAuthenticated,
    IncorrectCredentials,
    NotFound,
    Duplicate,
    Storage,
    Session,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBody => write!(f, "malformed_body"),
            Self::Validation => write!(f, "validation"),
            Self::NotAuthenticated => write!(f, "not_authenticated"),
            Self::IncorrectCredentials => write!(f, "incorrect_credentials"),
            Self::NotFound => write!(f, "not_found"),
            Self::Duplicate => write!(f, "duplicate"),
            Self::Storage => write!(f, "storage"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// API error with status code
///
/// Server-side failures keep their cause in `detail` for the logs and send a
/// generic message to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ApiErrorKind,
    pub response: ApiErrorResponse,
    pub detail: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            response: ApiErrorResponse {
                error: message.into(),
            },
            detail: None,
        }
    }

    fn server(kind: ApiErrorKind, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, kind, INTERNAL_ERROR_MESSAGE)
        }
    }

    /// Body could not be decoded
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorKind::MalformedBody, message)
    }

    /// Body was empty, `null`, or carried nothing to act on
    pub fn empty_body() -> Self {
        Self::malformed_body(EMPTY_BODY_MESSAGE)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, ApiErrorKind::Validation, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, ApiErrorKind::Duplicate, message)
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorKind::NotAuthenticated,
            NOT_AUTHENTICATED_MESSAGE,
        )
    }

    pub fn incorrect_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorKind::IncorrectCredentials,
            INCORRECT_CREDENTIALS_MESSAGE,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorKind::NotFound, message)
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        Self::server(ApiErrorKind::Storage, detail)
    }

    pub fn session(detail: impl Into<String>) -> Self {
        Self::server(ApiErrorKind::Session, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.detail.as_deref().unwrap_or(&self.response.error);

        if self.status.is_server_error() {
            error!(status = %self.status.as_u16(), kind = %self.kind, error = %detail, "Request failed");
        } else {
            debug!(status = %self.status.as_u16(), kind = %self.kind, error = %detail, "Request rejected");
        }

        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::validation(message),
            DomainError::Duplicate { message } => Self::duplicate(message),
            DomainError::Hashing { message } => Self::validation(message),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Storage { message } => Self::storage(message),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::session(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.response.error)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::malformed_body("Invalid JSON syntax");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.kind, ApiErrorKind::MalformedBody);
        assert_eq!(err.response.error, "Invalid JSON syntax");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::incorrect_credentials();
        let json = serde_json::to_string(&err.response).unwrap();

        assert_eq!(json, r#"{"error":"incorrect user email or password"}"#);
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY, ApiErrorKind::Validation),
            (DomainError::duplicate("taken"), StatusCode::UNPROCESSABLE_ENTITY, ApiErrorKind::Duplicate),
            (DomainError::hashing("too long"), StatusCode::UNPROCESSABLE_ENTITY, ApiErrorKind::Validation),
            (DomainError::not_found("gone"), StatusCode::NOT_FOUND, ApiErrorKind::NotFound),
            (DomainError::storage("down"), StatusCode::INTERNAL_SERVER_ERROR, ApiErrorKind::Storage),
        ];

        for (domain_err, status, kind) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
            assert_eq!(api_err.kind, kind);
        }
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err: ApiError = DomainError::storage("password authentication failed for user").into();

        assert_eq!(err.response.error, INTERNAL_ERROR_MESSAGE);
        assert!(err.detail.unwrap().contains("password authentication failed"));
    }

    #[test]
    fn test_session_error_conversion() {
        let err: ApiError = SessionError::Signing("bad key".to_string()).into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, ApiErrorKind::Session);
    }

    #[test]
    fn test_all_error_statuses() {
        assert_eq!(ApiError::empty_body().status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_authenticated().status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::incorrect_credentials().status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("").status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::storage("").status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::session("").status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
