//! Error types for the identity-provider boundary.

use thiserror::Error;

/// Result type alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An account with this email already exists.
    #[error("email already in use: {0}")]
    EmailExists(String),

    /// No account matches the lookup.
    #[error("no account for {0}")]
    UserNotFound(String),

    /// A session token failed verification. Malformed, expired and revoked
    /// tokens are indistinguishable here.
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// The provider's exchange response carried no session token.
    #[error("provider response lacked a session token")]
    MissingSessionToken,

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Transport-level failure talking to the provider.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("provider rejected request: status {status}: {message}")]
    Provider { status: u16, message: String },

    /// Authorization for an admin call failed.
    #[error("provider authorization failed: {0}")]
    Auth(#[from] feedline_core::TokenError),

    /// Credential hashing failed.
    #[error("credential hashing failed: {0}")]
    Hashing(String),

    /// The provider returned a payload this client cannot interpret.
    #[error("malformed provider response: {0}")]
    Decode(String),
}
