//! Request/response types shared by the handlers

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorKind, ApiErrorResponse};
pub use json::Json;
