//! Shared handler state.

use std::sync::Arc;

use crate::cart::SessionEventHub;
use crate::config::StorefrontConfig;
use crate::platform::{CustomerClient, StoreClient};

/// Everything a handler needs: config, the two platform clients, and the
/// per-session event hub. One `Arc` inside, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: StoreClient,
    customer: CustomerClient,
    events: SessionEventHub,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store = StoreClient::new(&config.platform);
        let customer = CustomerClient::new(&config.platform);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                customer,
                events: SessionEventHub::new(),
            }),
        }
    }

    /// The storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Client for the public store endpoints (catalog, pages, contact).
    #[must_use]
    pub fn store(&self) -> &StoreClient {
        &self.inner.store
    }

    /// Client for the customer endpoints (auth, carts, orders, addresses).
    #[must_use]
    pub fn customer(&self) -> &CustomerClient {
        &self.inner.customer
    }

    /// Hub of per-session broadcast channels for live page updates.
    #[must_use]
    pub fn events(&self) -> &SessionEventHub {
        &self.inner.events
    }
}
