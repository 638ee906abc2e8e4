//! Application state shared across handlers.

use std::sync::Arc;

use webca_session::{SessionBinder, SessionRegistry};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Binds request cookies to registry sessions.
    pub binder: SessionBinder,
}

impl AppState {
    /// Create application state with a fresh session registry.
    pub fn new(config: ServerConfig) -> Self {
        let registry = SessionRegistry::new(config.session.clone());
        Self::with_binder(config, SessionBinder::new(registry))
    }

    /// Create application state around an existing binder.
    ///
    /// The binder's registry settings take precedence over `config.session`.
    pub fn with_binder(config: ServerConfig, binder: SessionBinder) -> Self {
        Self {
            config: Arc::new(config),
            binder,
        }
    }

    /// Get the server config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the session registry.
    pub fn registry(&self) -> &SessionRegistry {
        self.binder.registry()
    }
}
