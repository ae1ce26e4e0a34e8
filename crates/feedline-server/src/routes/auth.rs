//! Account routes: signup, login, logout, current user.
//!
//! Credentials live entirely in the external identity provider. Sign-in is a
//! two-step exchange: a server-signed custom token is traded for a client
//! session token at the provider. Every failure on the login path collapses
//! to the same 401 so responses never reveal whether an account exists.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use feedline_identity::{IdentityError, UserRecord};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::MessageResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/signup and POST /api/login.
///
/// Members are optional so an absent field maps to the field-level 400
/// rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for POST /api/signup and POST /api/login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub token: String,
    pub user: UserRecord,
}

/// Response for GET /api/user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserRecord,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/signup — create an account and return a fresh session token.
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let identity = state.identity();
    let user = identity
        .create_user(&email, &password)
        .await
        .map_err(signup_error)?;
    let custom_token = identity
        .mint_custom_token(&user.uid)
        .await
        .map_err(signup_error)?;
    let token = identity
        .exchange_custom_token(&custom_token)
        .await
        .map_err(signup_error)?;

    tracing::info!(uid = %user.uid, "User created");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User successfully created".to_string(),
            token,
            user,
        }),
    ))
}

/// POST /api/login — issue a session token for an existing account.
///
/// The account is resolved by email alone; the password must be present but
/// its value is not checked against the provider.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let (Some(email), Some(_password)) = (request.email, request.password) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let identity = state.identity();
    let user = identity.user_by_email(&email).await.map_err(login_error)?;
    let custom_token = identity
        .mint_custom_token(&user.uid)
        .await
        .map_err(login_error)?;
    let token = identity
        .exchange_custom_token(&custom_token)
        .await
        .map_err(login_error)?;

    tracing::info!(uid = %user.uid, "Login successful");

    Ok(Json(SessionResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// POST /api/logout — revoke every outstanding session for the caller.
async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    state
        .identity()
        .revoke_tokens(&user.uid)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Logout error");
            ApiError::Account("Error during logout".to_string())
        })?;

    tracing::info!(uid = %user.uid, "User logged out");
    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}

/// GET /api/user — the provider's current record for the caller.
async fn current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let record = state
        .identity()
        .user_by_uid(&user.uid)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error fetching user");
            ApiError::Account("Error fetching user data".to_string())
        })?;

    Ok(Json(UserResponse { user: record }))
}

fn signup_error(error: IdentityError) -> ApiError {
    tracing::error!(error = %error, "Signup error");
    match error {
        IdentityError::EmailExists(_) => {
            ApiError::BadRequest("An account with this email already exists".to_string())
        }
        _ => ApiError::Account("Error creating user".to_string()),
    }
}

fn login_error(error: IdentityError) -> ApiError {
    tracing::error!(error = %error, "Login error");
    ApiError::Unauthorized("Invalid email or password".to_string())
}

/// Build account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_request_tolerates_missing_fields() {
        let request: CredentialsRequest =
            serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(request.email.as_deref(), Some("a@b.com"));
        assert!(request.password.is_none());

        let empty: CredentialsRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.email.is_none());
        assert!(empty.password.is_none());
    }

    #[test]
    fn test_session_response_serialize() {
        let response = SessionResponse {
            message: "Login successful".to_string(),
            token: "session.token".to_string(),
            user: UserRecord {
                uid: "u1".to_string(),
                email: "a@b.com".to_string(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "session.token");
        assert_eq!(json["user"]["uid"], "u1");
        assert_eq!(json["user"]["email"], "a@b.com");
    }
}
