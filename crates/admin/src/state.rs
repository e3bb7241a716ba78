//! Shared handler state.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::platform::AdminClient;

/// Everything a dashboard handler needs: the config and the authenticated
/// platform client. One `Arc` inside, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    platform: AdminClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let platform = AdminClient::new(&config.platform);

        Self {
            inner: Arc::new(AppStateInner { config, platform }),
        }
    }

    /// The admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Client for the key-authenticated management endpoints.
    #[must_use]
    pub fn platform(&self) -> &AdminClient {
        &self.inner.platform
    }
}
