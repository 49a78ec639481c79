//! Application state shared across handlers.

use std::sync::Arc;

use sokoni_backend::Backend;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn Backend>,
}

impl AppState {
    /// Create a new application state around a connected backend.
    #[must_use]
    pub fn new(config: AdminConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the backend handle.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }
}
