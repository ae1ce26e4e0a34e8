//! Error types for the document-store boundary.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed document does not exist (merge-update precondition).
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// Invalid collection path or document key.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Transport-level failure talking to the store.
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store rejected request: status {status}: {message}")]
    Provider { status: u16, message: String },

    /// Authorization for an admin call failed.
    #[error("store authorization failed: {0}")]
    Auth(#[from] feedline_core::TokenError),

    /// The store returned a payload this client cannot interpret.
    #[error("malformed store response: {0}")]
    Decode(String),
}
