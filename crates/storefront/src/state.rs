//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{DurableStore, SlotStorage};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and visitor slot storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: SlotStorage,
}

impl AppState {
    /// Create a new application state over a durable backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, durable: DurableStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage: SlotStorage::new(durable),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the visitor slot storage.
    #[must_use]
    pub fn storage(&self) -> &SlotStorage {
        &self.inner.storage
    }
}
