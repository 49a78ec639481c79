//! Application state shared across handlers.

use std::sync::Arc;

use sokoni_backend::Backend;

use crate::config::StorefrontConfig;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend handle and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    carts: CartService,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state around a connected backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: Arc<dyn Backend>) -> Self {
        let carts = CartService::new(Arc::clone(&backend));
        let catalog = CatalogService::new(Arc::clone(&backend));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                carts,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend handle.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
