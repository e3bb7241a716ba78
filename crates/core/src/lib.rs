//! Vendora Core - Shared types library.
//!
//! The vocabulary both Vendora frontends speak: the `storefront` (the
//! customer-facing shop) and the `admin` dashboard. All durable state lives
//! behind the platform API, so this crate carries no I/O and no HTTP
//! clients, only the [`types`] the two binaries use to talk about it:
//! newtype IDs, prices, validated emails, and lifecycle statuses.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
