//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, QKartClient};
use crate::config::StorefrontConfig;
use crate::search::SearchDebouncer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the backend client, the search debouncer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: QKartClient,
    debouncer: SearchDebouncer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = QKartClient::new(&config.api)?;
        let debouncer = SearchDebouncer::new(config.search_debounce);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                debouncer,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the QKart API client.
    #[must_use]
    pub fn api(&self) -> &QKartClient {
        &self.inner.api
    }

    /// Get a reference to the search debouncer.
    #[must_use]
    pub fn debouncer(&self) -> &SearchDebouncer {
        &self.inner.debouncer
    }
}
