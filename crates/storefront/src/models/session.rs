//! Session-stored state.
//!
//! Types and helpers for data kept in the per-visitor session: the signed-in
//! customer, one-shot flash messages, the OTP challenge between the send and
//! verify steps, and the key tying the session to its in-process event bus.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use vendora_core::CustomerId;

/// Session-stored customer identity.
///
/// Minimal data kept after OTP verification. The token is replayed as
/// `X-Auth-Token` on customer-scoped platform calls; everything else about
/// the customer lives on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Platform customer ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: String,
    /// Display name, when the platform has one.
    pub name: Option<String>,
    /// Customer auth token issued by the platform.
    pub token: String,
}

impl CurrentCustomer {
    /// Short name for the header greeting, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// OTP challenge state between the send and verify steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    /// Email the one-time code was sent to.
    pub email: String,
    /// Path to land on after a successful login.
    pub next: Option<String>,
}

/// One-shot message rendered on the next full page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class suffix for the flash banner.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the pending OTP challenge.
    pub const PENDING_LOGIN: &str = "pending_login";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";

    /// Key for the session's event-bus handle.
    pub const EVENT_CHANNEL: &str = "event_channel";
}

/// Reads the signed-in customer, if any.
pub async fn current_customer(
    session: &Session,
) -> Result<Option<CurrentCustomer>, tower_sessions::session::Error> {
    session.get(keys::CURRENT_CUSTOMER).await
}

/// Stores a one-shot flash message for the next page load.
pub async fn set_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let flash = Flash { level, message: message.into() };
    session.insert(keys::FLASH, flash).await
}

/// Takes (and clears) the pending flash message.
pub async fn take_flash(
    session: &Session,
) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove(keys::FLASH).await
}

/// Returns the stable key tying this session to its in-process event bus.
///
/// Session ids rotate on save, so a dedicated random key is minted on first
/// use and reused for the session's lifetime. Logout removes the hub entry
/// under this key.
pub async fn event_channel_key(
    session: &Session,
) -> Result<String, tower_sessions::session::Error> {
    if let Some(key) = session.get::<String>(keys::EVENT_CHANNEL).await? {
        return Ok(key);
    }
    let key = Uuid::new_v4().to_string();
    session.insert(keys::EVENT_CHANNEL, key.clone()).await?;
    Ok(key)
}
