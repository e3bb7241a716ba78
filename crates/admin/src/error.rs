//! Dashboard error type and its HTTP mapping.
//!
//! Management handlers return [`Result`]; every failure they see comes from
//! the platform API or the session store, so the error type carries exactly
//! those two cases. Server faults are captured to Sentry before the response
//! goes out.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::platform::PlatformError;

/// Application-level error type for the admin dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// The platform API refused or failed a call.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The session store failed under a request.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// The dashboard is single-operator, but platform error bodies can still
    /// quote internals; client-facing messages stay generic.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Platform(err) => match err {
                PlatformError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
                PlatformError::RateLimited(_) => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests, slow down".to_string(),
                ),
                _ => (StatusCode::BAD_GATEWAY, "Platform backend error".to_string()),
            },
            Self::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }

    fn is_server_fault(&self) -> bool {
        match self {
            Self::Session(_) => true,
            Self::Platform(err) => !matches!(err, PlatformError::NotFound(_)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed");
        }

        self.status_and_message().into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_errors_map_to_upstream_statuses() {
        let cases = [
            (PlatformError::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
            (PlatformError::RateLimited(30), StatusCode::TOO_MANY_REQUESTS),
            (
                PlatformError::Api {
                    status: 500,
                    message: "boom".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = AppError::from(err).status_and_message();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_platform_detail_never_reaches_the_owner() {
        let err = AppError::from(PlatformError::Api {
            status: 502,
            message: "internal host 10.0.3.7 unreachable".to_string(),
        });
        let (_, message) = err.status_and_message();
        assert!(!message.contains("10.0.3.7"));
    }

    #[test]
    fn test_missing_resources_are_not_sentry_events() {
        assert!(!AppError::from(PlatformError::NotFound("cat_9".to_string())).is_server_fault());
        assert!(AppError::from(PlatformError::RateLimited(5)).is_server_fault());
    }
}
