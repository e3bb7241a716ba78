//! Vendora platform API client for store-owner operations.
//!
//! # Architecture
//!
//! - The platform is source of truth - NO local persistence, direct API calls
//! - Every response arrives in a `{ success, data, message }` envelope
//! - Bodies are read as text first so non-JSON error pages (proxies, load
//!   balancers) surface with their status instead of as bare parse errors
//! - All owner endpoints are authorized with `Authorization: Bearer <key>`;
//!   the key comes from config except at login, where the submitted candidate
//!   is sent so the platform itself decides whether it opens this store
//!
//! # Example
//!
//! ```rust,ignore
//! use vendora_admin::platform::AdminClient;
//!
//! let client = AdminClient::new(&config.platform);
//!
//! // Check the key and fetch the store in one call
//! let store = client.store_details().await?;
//!
//! // Manage the catalog
//! let page = client.list_products(1, None).await?;
//! ```

pub mod client;
pub mod types;

pub use client::AdminClient;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when talking to the platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The platform rejected the request.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl PlatformError {
    /// Whether this error means the Bearer key was rejected.
    ///
    /// Used by the login flow to distinguish "wrong key" from "platform
    /// down", which deserve different messages on the form.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Response envelope used by every platform endpoint.
///
/// `success` is authoritative: a `200 OK` carrying `success: false` is still
/// a failure, with the human-readable reason in `message` (or `error` on a
/// few older endpoints).
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope into its payload.
    ///
    /// Fails when the HTTP status is non-success, when `success` is false,
    /// or when a successful envelope is missing its `data` field.
    pub fn into_data(self, status: reqwest::StatusCode) -> Result<T, PlatformError> {
        self.check(status)?;
        self.data.ok_or_else(|| PlatformError::Api {
            status: status.as_u16(),
            message: "successful response missing data".to_string(),
        })
    }

    /// Unwrap an envelope whose payload does not matter (writes, deletes).
    pub fn into_unit(self, status: reqwest::StatusCode) -> Result<(), PlatformError> {
        self.check(status)
    }

    fn check(&self, status: reqwest::StatusCode) -> Result<(), PlatformError> {
        if status.is_success() && self.success {
            return Ok(());
        }

        let message = self
            .message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown platform error".to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(message));
        }

        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decode a platform response into its status and envelope.
///
/// Handles the cross-cutting failure modes in one place: 429 becomes
/// [`PlatformError::RateLimited`] with the `Retry-After` value, and bodies
/// that are not envelope JSON are reported with their HTTP status.
pub(crate) async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<(reqwest::StatusCode, ApiEnvelope<T>), PlatformError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(PlatformError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    match serde_json::from_str::<ApiEnvelope<T>>(&body) {
        Ok(envelope) => Ok((status, envelope)),
        Err(source) if status.is_success() => {
            tracing::error!(
                status = %status,
                body = %truncate_body(&body),
                "platform returned unparseable success body"
            );
            Err(PlatformError::Parse(source))
        }
        Err(_) => Err(PlatformError::Api {
            status: status.as_u16(),
            message: truncate_body(&body),
        }),
    }
}

/// Clip a response body for logs and error messages.
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;

    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        let clipped: String = body.chars().take(MAX_CHARS).collect();
        format!("{clipped}...")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ApiEnvelope<serde_json::Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_envelope_success_yields_data() {
        let env = envelope(r#"{"success":true,"data":{"name":"Vendora Outfitters"}}"#);
        let data = env.into_data(reqwest::StatusCode::OK).unwrap();
        assert_eq!(data["name"], "Vendora Outfitters");
    }

    #[test]
    fn test_envelope_success_false_is_api_error() {
        let env = envelope(r#"{"success":false,"message":"Invalid API key"}"#);
        let err = env.into_data(reqwest::StatusCode::OK).unwrap_err();
        match err {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_envelope_404_maps_to_not_found() {
        let env = envelope(r#"{"success":false,"message":"no such category"}"#);
        let err = env.into_data(reqwest::StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(m) if m == "no such category"));
    }

    #[test]
    fn test_envelope_unit_ignores_missing_data() {
        let env = envelope(r#"{"success":true,"message":"deleted"}"#);
        env.into_unit(reqwest::StatusCode::OK).unwrap();
    }

    #[test]
    fn test_auth_rejection_covers_401_and_403() {
        let unauthorized = PlatformError::Api {
            status: 401,
            message: "bad key".to_string(),
        };
        let forbidden = PlatformError::Api {
            status: 403,
            message: "wrong store".to_string(),
        };
        let server = PlatformError::Api {
            status: 500,
            message: "boom".to_string(),
        };

        assert!(unauthorized.is_auth_rejection());
        assert!(forbidden.is_auth_rejection());
        assert!(!server.is_auth_rejection());
        assert!(!PlatformError::NotFound("x".to_string()).is_auth_rejection());
    }

    #[test]
    fn test_truncate_body_clips_long_bodies() {
        let long = "x".repeat(500);
        let clipped = truncate_body(&long);
        assert_eq!(clipped.chars().count(), 203); // 200 chars + "..."
        assert!(clipped.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }
}
