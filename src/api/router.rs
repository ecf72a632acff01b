use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::authorized;
use super::middleware::{cors_layer, logging_middleware, request_id_middleware};
use super::state::AppState;

/// Create the full router with application state
///
/// Layers run outermost first: request id, logging, tracing, CORS. The
/// `/authorized` group adds session authentication on top.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public endpoints
        .merge(auth::create_auth_router())
        // Session-protected endpoints
        .nest(
            "/authorized",
            authorized::create_authorized_router(state.clone()),
        )
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
}
