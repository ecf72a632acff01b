//! Session authentication middleware

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::context::RequestContext;
use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Resolve the session cookie to a stored user and attach it to the
/// [`RequestContext`]. Runs only on the protected routes.
///
/// No session, no `user_id` in it, or an id with no stored user all reject
/// with `401`. Any other storage failure is a `500`.
pub async fn authenticate_user(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .get(request.headers(), &state.session_name)
        .await?;

    let Some(user_id) = session.user_id() else {
        debug!("Session carries no user id");
        return Err(ApiError::not_authenticated());
    };

    let user = match state.users.find_by_id(user_id).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            debug!(user_id = %user_id, "Session refers to unknown user");
            return Err(ApiError::not_authenticated());
        }
        Err(e) => return Err(e.into()),
    };

    let extensions = request.extensions_mut();
    match extensions.get_mut::<RequestContext>() {
        Some(ctx) => ctx.user = Some(user),
        None => {
            extensions.insert(RequestContext {
                user: Some(user),
                ..RequestContext::default()
            });
        }
    }

    Ok(next.run(request).await)
}
