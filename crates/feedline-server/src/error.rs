//! API error types with JSON responses.
//!
//! The client reads two body shapes: feed-data failures are
//! `{"error": <message>}`, account and authentication failures are
//! `{"message": <message>}`. Handlers map upstream failures to one of these
//! at their own boundary and log the detail; the generic client message
//! never carries it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed client input (400, `message` body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or revoked credentials (401, `message` body).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The addressed feed document does not exist (404, `error` body).
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream failure in a feed-data route (500, `error` body).
    #[error("feed operation failed: {0}")]
    Feed(String),

    /// Upstream failure in an account route (500, `message` body).
    #[error("account operation failed: {0}")]
    Account(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Feed(_) | Self::Account(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body key for this error's response.
    fn body_key(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::Feed(_) => "error",
            Self::BadRequest(_) | Self::Unauthorized(_) | Self::Account(_) => "message",
        }
    }

    fn client_message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::Feed(m)
            | Self::Account(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = serde_json::Map::new();
        body.insert(
            self.body_key().to_string(),
            Value::String(self.client_message().to_string()),
        );
        (status, Json(Value::Object(body))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Feed("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Account("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_shape_per_surface() {
        assert_eq!(ApiError::Feed("x".into()).body_key(), "error");
        assert_eq!(ApiError::NotFound("x".into()).body_key(), "error");
        assert_eq!(ApiError::Account("x".into()).body_key(), "message");
        assert_eq!(ApiError::Unauthorized("x".into()).body_key(), "message");
        assert_eq!(ApiError::BadRequest("x".into()).body_key(), "message");
    }
}
