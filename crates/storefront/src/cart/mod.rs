//! Dual-mode shopping cart.
//!
//! # Architecture
//!
//! The cart lives in one of two places depending on who is shopping:
//!
//! - **Guests**: lines persist in the session record under a fixed key,
//!   managed by [`store::LocalCartStore`]. No account, no server round-trips.
//! - **Customers**: the platform owns the cart; mutations go through the
//!   [`facade::CartApi`] client, keyed by server-assigned line ids.
//!
//! Routes never branch on auth state themselves: [`facade::CartSession`]
//! presents one surface and routes every operation to the right backend.
//!
//! When a guest signs in, the façade migrates the local cart to the server
//! exactly once, best-effort: batch-add, then clear local state regardless
//! of the outcome, so a retry can never double-add.
//!
//! Every mutation broadcasts a payload-free [`events::SessionEvent`] on the
//! session's bus; renderers re-read state instead of trusting event data.

pub mod events;
pub mod facade;
pub mod store;

pub use events::{EventBus, SessionEvent, SessionEventHub};
pub use facade::{AddToCart, CartApi, CartAuth, CartError, CartSession, CartSnapshot, LineKey};
pub use store::{
    CART_STORAGE_KEY, CartStorage, LocalCartLine, LocalCartStore, SessionCartStorage, StorageError,
};
