//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VENDORA_API_BASE_URL` - Platform API root (e.g., <https://api.vendora.dev/api/v1>)
//! - `VENDORA_STORE_ID` - ID of the store this deployment serves
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)
//!
//! The storefront holds no credentials: public endpoints are addressed by
//! store ID alone, and customer tokens live in server-side sessions.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use vendora_core::StoreId;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    Missing { name: String },
    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Platform API configuration
    pub platform: PlatformConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: String,
    /// Fraction of errors reported to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of requests traced for performance
    pub sentry_traces_sample_rate: f32,
}

/// Platform API addressing shared by the API clients.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform API root URL, without a trailing slash
    pub api_base_url: String,
    /// The store all requests are scoped to
    pub store_id: StoreId,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is absent or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = env_or("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "STOREFRONT_HOST".to_string(),
                reason: e.to_string(),
            })?;
        let port = env_or("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                name: "STOREFRONT_PORT".to_string(),
                reason: e.to_string(),
            })?;
        let base_url = required_env("STOREFRONT_BASE_URL")?;

        let platform = PlatformConfig::from_env()?;

        let sentry_dsn = optional_env("SENTRY_DSN");
        let sentry_environment = env_or("SENTRY_ENVIRONMENT", "development");
        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            base_url,
            platform,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS (controls cookie flags).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl PlatformConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = required_env("VENDORA_API_BASE_URL")?;
        // Fail fast on an unparseable URL rather than on the first request.
        url::Url::parse(&api_base_url).map_err(|e| ConfigError::Invalid {
            name: "VENDORA_API_BASE_URL".to_string(),
            reason: e.to_string(),
        })?;

        let store_id = StoreId::new(required_env("VENDORA_STORE_ID")?);

        Ok(Self {
            api_base_url,
            store_id,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing {
        name: name.to_string(),
    })
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse a sample-rate variable, clamped to `0.0..=1.0`.
fn parse_rate(name: &str, default: f32) -> Result<f32, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => {
            let rate = raw.parse::<f32>().map_err(|e| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            Ok(rate.clamp(0.0, 1.0))
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            platform: PlatformConfig {
                api_base_url: "https://api.vendora.test/api/v1".to_string(),
                store_id: StoreId::new("store_1"),
            },
            sentry_dsn: None,
            sentry_environment: "development".to_string(),
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_is_secure_requires_https() {
        let mut config = test_config();
        assert!(!config.is_secure());

        config.base_url = "https://shop.vendora.test".to_string();
        assert!(config.is_secure());
    }
}
