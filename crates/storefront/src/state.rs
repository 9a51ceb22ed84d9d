//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::feed::ProductFeed;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    feed: ProductFeed,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let feed = ProductFeed::new(config.products_file.clone(), config.upload_dir.clone());
        Self {
            inner: Arc::new(AppStateInner { config, feed }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product feed.
    #[must_use]
    pub fn feed(&self) -> &ProductFeed {
        &self.inner.feed
    }
}
