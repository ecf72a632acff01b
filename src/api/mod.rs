//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod authorized;
pub mod context;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use context::{CurrentUser, RequestContext};
pub use router::create_router;
pub use state::AppState;
