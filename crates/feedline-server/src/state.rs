//! Application state shared across handlers.

use std::sync::Arc;

use feedline_identity::IdentityProvider;
use feedline_store::DocumentStore;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using
/// `State<AppState>`. The store and provider handles are injected at
/// construction, so tests substitute in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
    /// Identity provider handle.
    identity: Arc<dyn IdentityProvider>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config: Arc::new(config),
        }
    }

    /// Get a reference to the document store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get a reference to the identity provider.
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
