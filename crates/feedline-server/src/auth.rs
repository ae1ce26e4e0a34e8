//! Bearer-token authentication for protected routes.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Single response message for every authentication failure; the cause is
/// logged, never returned.
const UNAUTHORIZED: &str = "Unauthorized access";

/// Identity attached to a request after token verification.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Verified account id.
    pub uid: String,
    /// Account email, when the provider includes it in the claims.
    pub email: Option<String>,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED.to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED.to_string()))?;

        let claims = state
            .identity()
            .verify_session_token(token)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Token verification failed");
                ApiError::Unauthorized(UNAUTHORIZED.to_string())
            })?;

        Ok(AuthenticatedUser {
            uid: claims.uid,
            email: claims.email,
        })
    }
}
