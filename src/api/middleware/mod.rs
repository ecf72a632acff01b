//! API middleware components
//!
//! Applied outermost first: request id, logging, CORS, then session
//! authentication on the protected routes only.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod request_id;

pub use auth::authenticate_user;
pub use cors::cors_layer;
pub use logging::logging_middleware;
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
