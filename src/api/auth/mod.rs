//! Public authentication endpoints
//!
//! Sign-up creates an account; sign-in checks credentials and stores the
//! user id in the session cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::User;

/// Create the public authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
}

/// Email and password pair
///
/// Missing and `null` fields both read as empty strings and are left to
/// validation.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> (String, String) {
        (
            self.email.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

/// Register a new user
///
/// POST /sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = request.into_parts();
    let user = state.users.create(User::new(email, password)).await?;

    info!(user_id = %user.id(), "User signed up");

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

/// Check credentials and start a session
///
/// POST /sign-in
///
/// Unknown email and wrong password are indistinguishable to the client.
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = request.into_parts();

    let user = match state.users.find_by_email(&email).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => return Err(ApiError::incorrect_credentials()),
        Err(e) => return Err(e.into()),
    };

    if !user.has_same_password(&password, state.hasher.as_ref()) {
        return Err(ApiError::incorrect_credentials());
    }

    let mut session = state.sessions.get(&headers, &state.session_name).await?;
    session.set_user_id(user.id())?;
    let cookie = state.sessions.save(&session).await?;

    info!(user_id = %user.id(), "User signed in");

    Ok(([(header::SET_COOKIE, cookie)], Json(user.sanitized())))
}
