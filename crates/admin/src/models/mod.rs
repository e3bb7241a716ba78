//! Session-stored state for the dashboard.
//!
//! The owner session is deliberately thin: login proves key possession
//! against the platform, and the session records only that proof plus the
//! store name for the chrome. The working credential stays in config.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session-stored owner identity.
///
/// Present once the owner has validated the store API key. Holds no key
/// material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentOwner {
    /// Store name, shown in the sidebar.
    pub store_name: String,
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
    /// Key for the signed-in owner.
    pub const CURRENT_OWNER: &str = "current_owner";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";
}

/// Stores a one-shot flash message for the next page load.
pub async fn set_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let flash = Flash {
        level,
        message: message.into(),
    };
    session.insert(keys::FLASH, flash).await
}

/// Takes (and clears) the pending flash message.
pub async fn take_flash(
    session: &Session,
) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove(keys::FLASH).await
}
