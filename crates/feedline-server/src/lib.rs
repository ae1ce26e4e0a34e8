//! feedline-server: HTTP API server for the Feedline social feed
//!
//! This crate provides:
//! - REST endpoints for publications, nested comments and nested likes
//! - Email/password account endpoints backed by the identity provider
//! - Bearer-token authentication for the protected account routes
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! Every handler is a single translation from HTTP input to one document
//! store or identity provider call; the store and provider handles are
//! injected through [`AppState`] so tests run against in-memory
//! implementations.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedline_server::{config::ServerConfig, routes, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let state = AppState::new(store, identity, config);
//! let app = routes::build_router(state);
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export the boundary crates
pub use feedline_identity;
pub use feedline_store;
