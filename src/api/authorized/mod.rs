//! Session-protected endpoints under `/authorized`

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::api::context::CurrentUser;
use crate::api::middleware::authenticate_user;
use crate::api::state::AppState;
use crate::api::types::json::decode_json;
use crate::api::types::{ApiError, Json};
use crate::domain::User;

/// Create the protected router; every matched route passes through
/// [`authenticate_user`] first.
pub fn create_authorized_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/whoami", get(whoami))
        .route("/users", get(list_users))
        .route("/update", post(update_current_user).put(update_current_user))
        .route("/delete", delete(delete_current_user))
        .route("/logout", put(logout))
        .route_layer(middleware::from_fn_with_state(state, authenticate_user))
}

/// Partial update of the current user
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }

    fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.set_email(email);
        }
        if let Some(password) = self.password {
            user.set_password(password);
        }
    }
}

/// GET /authorized/whoami
pub async fn whoami(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user.sanitized())
}

/// GET /authorized/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.all_users().await?;

    Ok(Json(users.into_iter().map(User::without_password).collect()))
}

/// POST|PUT /authorized/update
///
/// Body fields overwrite the stored user; absent fields are kept. An empty
/// body, `null`, or an object without known fields is rejected.
pub async fn update_current_user(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let request = parse_update_request(&body)?;
    request.apply(&mut user);

    let user = state.users.update(user).await?;

    info!(user_id = %user.id(), "User updated");

    Ok(Json(user.sanitized()))
}

/// DELETE /authorized/delete
///
/// The session is left as is; the next protected request gets `401`.
pub async fn delete_current_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.users.delete(user.id()).await?;

    info!(user_id = %user.id(), "User deleted");

    Ok(StatusCode::OK)
}

/// PUT /authorized/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let mut session = state.sessions.get(&headers, &state.session_name).await?;
    session.clear_user_id();
    let cookie = state.sessions.save(&session).await?;

    info!(user_id = %user.id(), "User logged out");

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

fn parse_update_request(body: &[u8]) -> Result<UpdateUserRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::empty_body());
    }

    let request: Option<UpdateUserRequest> = decode_json(body)?;

    match request {
        Some(request) if !request.is_empty() => Ok(request),
        _ => Err(ApiError::empty_body()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::error::EMPTY_BODY_MESSAGE;

    #[test]
    fn test_parse_update_request() {
        let request = parse_update_request(br#"{"email":"new@example.org"}"#).unwrap();

        assert_eq!(request.email.as_deref(), Some("new@example.org"));
        assert!(request.password.is_none());
    }

    #[test]
    fn test_parse_update_request_rejects_empty_input() {
        let bodies: [&[u8]; 5] = [b"", b"   ", b"null", b"{}", br#"{"unknown":1}"#];

        for body in bodies {
            let err = parse_update_request(body).unwrap_err();

            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.response.error, EMPTY_BODY_MESSAGE);
        }
    }

    #[test]
    fn test_parse_update_request_rejects_malformed_json() {
        let err = parse_update_request(b"{email").unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.response.error.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut user = User::new("old@example.org", "");
        UpdateUserRequest {
            email: None,
            password: Some("new-password".to_string()),
        }
        .apply(&mut user);

        assert_eq!(user.email(), "old@example.org");
        assert_eq!(user.password().original(), "new-password");
    }
}
