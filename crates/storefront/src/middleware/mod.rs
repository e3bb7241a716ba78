//! HTTP middleware for the storefront.
//!
//! Request flow, outermost first: Sentry capture, trace span, request ID,
//! CSP nonce, sessions, security headers, then the router (with per-route
//! rate limits on the login and cart sub-routers). Handlers pull
//! [`CspNonce`], [`RequireAuth`], and friends back out as extractors.

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_customer, set_current_customer};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
