//! Session layer for the storefront.
//!
//! Sessions are in-memory on purpose. The platform owns every piece of
//! durable state; a session only carries the signed-in customer, flash
//! messages, and the guest cart, so a restart costs shoppers nothing worse
//! than a login.

use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Cookie the session ID travels in.
pub const SESSION_COOKIE_NAME: &str = "vendora_session";

/// Guest carts are worth keeping around for a while.
const IDLE_EXPIRY_DAYS: i64 = 7;

/// Build the session layer.
///
/// `SameSite=Lax` keeps the session on cross-site navigations to us (links
/// from emails, search results) while still blocking cross-site posts.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(IDLE_EXPIRY_DAYS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
