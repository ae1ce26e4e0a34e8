//! feedline-core: shared foundation for the Feedline backend
//!
//! This crate provides:
//! - Service-account credential parsing (`ServiceAccount`)
//! - Cached OAuth2 access tokens for the hosted services (`TokenSource`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedline_core::{ServiceAccount, TokenSource, SCOPE_DATASTORE};
//!
//! let account = ServiceAccount::from_env()?;
//! let tokens = TokenSource::new(reqwest::Client::new(), account, &[SCOPE_DATASTORE])?;
//! let bearer = tokens.token().await?;
//! ```

pub mod credentials;
pub mod token;

pub use credentials::{CredentialError, ServiceAccount, SERVICE_ACCOUNT_ENV};
pub use token::{TokenError, TokenSource, SCOPE_DATASTORE, SCOPE_IDENTITY};
