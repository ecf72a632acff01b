//! Custom JSON extractor that returns errors as JSON

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use super::error::ApiError;

/// Custom JSON extractor that converts all rejection errors to JSON format
///
/// The body is decoded whatever the `Content-Type` header says. Unreadable
/// bodies, syntax errors and payloads of the wrong shape become a
/// `400 Bad Request` with an `{"error": ...}` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::malformed_body(format!(
                "Failed to read request body: {}",
                rejection.body_text()
            ))
        })?;

        decode_json(&body).map(Json)
    }
}

/// Decode a JSON body, mapping serde errors to `400` messages
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        let message = match err.classify() {
            Category::Data => format!("Invalid JSON data: {}", err),
            Category::Syntax | Category::Eof => format!("Invalid JSON syntax: {}", err),
            Category::Io => format!("Failed to read request body: {}", err),
        };
        ApiError::malformed_body(message)
    })
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Credentials {
        email: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload() {
        let Json(credentials) = Json::<Credentials>::from_request(json_request(r#"{"email":"abc@mail.com"}"#), &())
            .await
            .unwrap();

        assert_eq!(credentials.email, "abc@mail.com");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_bad_request() {
        let err = Json::<Credentials>::from_request(json_request(r#""invalid payload format""#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.response.error.starts_with("Invalid JSON data"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let err = Json::<Credentials>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.response.error.starts_with("Invalid JSON syntax"));
    }

    #[tokio::test]
    async fn test_content_type_is_not_required() {
        let request = axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(r#"{"email":"abc@mail.com"}"#))
            .unwrap();

        let Json(credentials) = Json::<Credentials>::from_request(request, &()).await.unwrap();
        assert_eq!(credentials.email, "abc@mail.com");
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let err = Json::<Credentials>::from_request(json_request(""), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.response.error.starts_with("Invalid JSON syntax"));
    }
}
