//! Session layer for the dashboard.
//!
//! In-memory sessions with stricter settings than the storefront. A restart
//! logs the owner out, which for a key-login dashboard costs one paste.

use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Cookie the session ID travels in.
pub const SESSION_COOKIE_NAME: &str = "vendora_admin_session";

/// Owners re-authenticate daily.
const IDLE_EXPIRY_HOURS: i64 = 24;

/// Build the session layer.
///
/// `SameSite=Strict`: nothing on another site has any business riding an
/// owner's session into the dashboard.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(IDLE_EXPIRY_HOURS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
