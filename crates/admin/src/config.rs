//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VENDORA_API_BASE_URL` - Platform API root (e.g., <https://api.vendora.dev/api/v1>)
//! - `VENDORA_STORE_ID` - ID of the store this dashboard manages
//! - `VENDORA_API_KEY` - Store API key (HIGH PRIVILEGE - full store access)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the dashboard (default: <http://localhost:3001>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)
//!
//! Unlike the storefront, this binary holds the store's API key. The key is
//! vetted at startup (placeholder fragments, entropy floor) so a dashboard
//! deployed with `changeme` never comes up, and it is kept in a
//! [`SecretString`] so it cannot leak through `Debug` output.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use vendora_core::StoreId;

/// Platform-issued keys are random; anything scoring below this floor was
/// typed by hand.
const MIN_KEY_BITS_PER_CHAR: f64 = 3.3;

/// Fragments that betray a key nobody ever replaced (matched case-insensitively).
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "changeme",
    "dummy",
    "example",
    "fixme",
    "insert",
    "placeholder",
    "sample",
    "secret",
    "test-key",
    "todo",
    "your-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    Missing { name: String },
    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
    #[error("{name} is not usable as a key: {reason}")]
    Insecure { name: String, reason: String },
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard
    pub base_url: String,
    /// Platform API configuration (includes the store API key)
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

/// Platform API addressing and credentials for the admin client.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE store key.
#[derive(Clone)]
pub struct PlatformConfig {
    /// Platform API root URL, without a trailing slash
    pub api_base_url: String,
    /// The store all requests are scoped to
    pub store_id: StoreId,
    /// Store API key (HIGH PRIVILEGE - full store access)
    pub api_key: SecretString,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_base_url", &self.api_base_url)
            .field("store_id", &self.store_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is absent, a value
    /// does not parse, or the store key fails vetting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = env_or("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "ADMIN_HOST".to_string(),
                reason: e.to_string(),
            })?;
        let port = env_or("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                name: "ADMIN_PORT".to_string(),
                reason: e.to_string(),
            })?;
        let base_url = env_or("ADMIN_BASE_URL", "http://localhost:3001");

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
        let api_key = required_key("VENDORA_API_KEY")?;

        Ok(Self {
            api_base_url,
            store_id,
            api_key,
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

/// Shannon entropy of the character distribution, in bits per character.
fn entropy_bits_per_char(value: &str) -> f64 {
    if value.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, f64> = HashMap::new();
    for ch in value.chars() {
        *counts.entry(ch).or_default() += 1.0;
    }
    let total: f64 = counts.values().sum();

    counts
        .values()
        .map(|count| {
            let share = count / total;
            -share * share.log2()
        })
        .sum()
}

/// Reject keys that were never issued: placeholder text, or too little
/// randomness to have come out of the platform's key generator.
fn vet_api_key(value: &str, name: &str) -> Result<(), ConfigError> {
    let lowered = value.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS
        .iter()
        .copied()
        .find(|fragment| lowered.contains(*fragment))
    {
        return Err(ConfigError::Insecure {
            name: name.to_string(),
            reason: format!("looks like a placeholder (contains {fragment:?})"),
        });
    }

    let entropy = entropy_bits_per_char(value);
    if entropy < MIN_KEY_BITS_PER_CHAR {
        return Err(ConfigError::Insecure {
            name: name.to_string(),
            reason: format!(
                "not random enough ({entropy:.2} bits/char, issued keys score >= {MIN_KEY_BITS_PER_CHAR}); use the key from the platform dashboard"
            ),
        });
    }

    Ok(())
}

fn required_key(name: &str) -> Result<SecretString, ConfigError> {
    let value = required_env(name)?;
    vet_api_key(&value, name)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AdminConfig {
        AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            platform: PlatformConfig {
                api_base_url: "https://api.vendora.test/api/v1".to_string(),
                store_id: StoreId::new("store_1"),
                api_key: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
            },
            sentry_dsn: None,
            sentry_environment: "development".to_string(),
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_entropy_of_a_constant_string_is_zero() {
        assert!(entropy_bits_per_char("").abs() < f64::EPSILON);
        assert!(entropy_bits_per_char("kkkkkkkk").abs() < f64::EPSILON);
    }

    #[test]
    fn test_entropy_of_a_coin_flip_is_one_bit() {
        let entropy = entropy_bits_per_char("abababab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_entropy_counts_characters_not_bytes() {
        // One distinct character, even a multibyte one, carries no information.
        assert!(entropy_bits_per_char("éééé").abs() < f64::EPSILON);
    }

    #[test]
    fn test_unreplaced_keys_are_rejected() {
        for key in ["your-key-goes-here", "changeme123", "sk_test-key_0001"] {
            let err = vet_api_key(key, "TEST_VAR").unwrap_err();
            assert!(
                matches!(err, ConfigError::Insecure { .. }),
                "{key} should be rejected as a placeholder"
            );
        }
    }

    #[test]
    fn test_hand_typed_keys_are_rejected() {
        let err = vet_api_key("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(err.to_string().contains("not random enough"));
    }

    #[test]
    fn test_issued_keys_pass() {
        assert!(vet_api_key("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
    }

    #[test]
    fn test_is_secure_requires_https() {
        let mut config = test_config();
        assert!(!config.is_secure());

        config.base_url = "https://admin.vendora.test".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_platform_config_debug_redacts_key() {
        let config = test_config();
        let debug_output = format!("{:?}", config.platform);

        assert!(debug_output.contains("api.vendora.test"));
        assert!(debug_output.contains("store_1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("aB3$xY9"));
    }
}
