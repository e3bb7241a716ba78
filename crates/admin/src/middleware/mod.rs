//! HTTP middleware for the dashboard.
//!
//! Request flow, outermost first: Sentry capture, trace span, request ID,
//! sessions, security headers, then the router. [`RequireOwner`] guards
//! every management route as an extractor.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireOwner, clear_current_owner, set_current_owner};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
