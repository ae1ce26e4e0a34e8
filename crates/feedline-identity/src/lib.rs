//! feedline-identity: identity-provider boundary for the Feedline backend
//!
//! This crate provides:
//! - The `IdentityProvider` trait: accounts, token issuance, verification,
//!   revocation
//! - `GoogleIdentity`: REST client for the hosted identity provider
//! - `MemoryIdentity`: in-memory implementation for tests and local
//!   development
//!
//! # Architecture
//!
//! Credential storage and token cryptography belong to the provider behind
//! the trait. Sign-in is a two-step exchange: a server-signed custom token
//! is traded for a client session token at the provider, and every protected
//! request verifies its bearer token back against the provider.

pub mod error;
pub mod google;
pub mod memory;
pub mod provider;

pub use error::{IdentityError, IdentityResult};
pub use google::GoogleIdentity;
pub use memory::MemoryIdentity;
pub use provider::{IdentityProvider, TokenClaims, UserRecord};
