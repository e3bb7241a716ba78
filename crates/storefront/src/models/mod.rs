//! Domain models for the storefront.

pub mod session;

pub use session::{CurrentCustomer, Flash, FlashLevel, PendingLogin};
