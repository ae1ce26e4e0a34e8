//! The identity-provider abstraction consumed by the HTTP facade.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::IdentityResult;

/// Provider record for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    /// Provider-assigned account id.
    pub uid: String,
    /// Account email.
    pub email: String,
}

/// Claims extracted from a verified session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// Account id the token was issued for.
    pub uid: String,
    /// Account email, when the provider includes it.
    pub email: Option<String>,
}

/// External identity provider: credential storage, session-token issuance
/// and verification, revocation bookkeeping.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. Fails with `IdentityError::EmailExists` when the
    /// email is taken.
    async fn create_user(&self, email: &str, password: &str) -> IdentityResult<UserRecord>;

    /// Account for `email`. Fails with `IdentityError::UserNotFound` when
    /// absent.
    async fn user_by_email(&self, email: &str) -> IdentityResult<UserRecord>;

    /// Account for `uid`.
    async fn user_by_uid(&self, uid: &str) -> IdentityResult<UserRecord>;

    /// Mint a short-lived server-signed token for `uid`.
    async fn mint_custom_token(&self, uid: &str) -> IdentityResult<String>;

    /// Exchange a custom token for a client session token.
    async fn exchange_custom_token(&self, custom_token: &str) -> IdentityResult<String>;

    /// Verify a session token. Every failure mode surfaces as
    /// `IdentityError::InvalidToken`.
    async fn verify_session_token(&self, token: &str) -> IdentityResult<TokenClaims>;

    /// Revoke all outstanding session tokens for `uid`.
    async fn revoke_tokens(&self, uid: &str) -> IdentityResult<()>;
}
