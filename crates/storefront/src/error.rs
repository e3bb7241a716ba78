//! Storefront error type and its HTTP mapping.
//!
//! Handlers return [`Result`]; the [`IntoResponse`] impl decides what the
//! shopper sees and what goes to Sentry. Shoppers get terse messages and the
//! right status code, Sentry gets the full error chain.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::CartError;
use crate::platform::PlatformError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// The platform API refused or failed a call.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The session store failed under a request.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Nothing lives at the requested path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The shopper submitted something the handler cannot work with.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<CartError> for AppError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::Api(platform) => Self::Platform(platform),
            CartError::KeyMismatch => Self::BadRequest("stale cart form, reload the page".to_string()),
        }
    }
}

impl AppError {
    /// Server-side faults are worth a Sentry event; shopper mistakes are not.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Session(_) => true,
            Self::Platform(err) => !matches!(err, PlatformError::NotFound(_)),
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// What the shopper sees. Platform error bodies can quote internals, so
    /// those collapse to a generic line; our own messages pass through.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Platform(err) => match err {
                PlatformError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found".to_string()),
                PlatformError::RateLimited(_) => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests, slow down".to_string(),
                ),
                _ => (StatusCode::BAD_GATEWAY, "Store backend error".to_string()),
            },
            Self::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
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

/// Tag Sentry events with the signed-in customer.
///
/// Called after OTP verification so errors group by who hit them.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Drop the customer tag at logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopper_mistakes_keep_their_detail() {
        let (status, message) =
            AppError::NotFound("no such page: tote-bags".to_string()).status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(message.contains("tote-bags"));

        let (status, _) = AppError::BadRequest("bad quantity".to_string()).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

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
    fn test_platform_detail_never_reaches_the_shopper() {
        let err = AppError::from(PlatformError::Api {
            status: 500,
            message: "token tok_123 rejected".to_string(),
        });
        let (_, message) = err.status_and_message();
        assert!(!message.contains("tok_123"));
    }

    #[test]
    fn test_cart_key_mismatch_is_bad_request() {
        let err = AppError::from(CartError::KeyMismatch);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_only_server_faults_reach_sentry() {
        assert!(AppError::Session(tower_sessions::session::Error::Store(
            tower_sessions::session_store::Error::Backend("down".to_string())
        ))
        .is_server_fault());
        assert!(AppError::from(PlatformError::RateLimited(5)).is_server_fault());
        assert!(!AppError::from(PlatformError::NotFound("gone".to_string())).is_server_fault());
        assert!(!AppError::BadRequest("typo".to_string()).is_server_fault());
    }
}
