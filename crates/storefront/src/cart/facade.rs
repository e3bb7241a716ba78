//! Auth-aware cart façade.
//!
//! Route handlers talk to one cart regardless of who is shopping. Guests
//! get the session-backed [`LocalCartStore`]; signed-in customers get the
//! server cart through a [`CartApi`] client. The façade also owns the
//! one-time guest cart migration that runs when a guest signs in.
//!
//! Mutations are keyed by [`LineKey`]: guest lines by product id, server
//! lines by the server-assigned line id. [`CartSession::line_key`] types a
//! raw form value for the active mode, and mismatched keys are rejected
//! rather than guessed around.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use vendora_core::{CartLineId, ProductId};

use super::events::{EventBus, SessionEvent};
use super::store::{CartStorage, LocalCartLine, LocalCartStore};
use crate::platform::PlatformError;
use crate::platform::types::{CartItemInput, ServerCartLine};

/// How the current session is authorized against the cart backend.
#[derive(Debug, Clone)]
pub enum CartAuth {
    /// No account; the cart lives in session storage.
    Guest,
    /// Signed in; the cart lives on the platform, authorized by this token.
    Customer(String),
}

/// Key identifying a cart line for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKey {
    /// Guest lines are keyed by catalog product.
    Product(ProductId),
    /// Server lines are keyed by the server-assigned line id.
    Line(CartLineId),
}

impl LineKey {
    /// The raw key value, as rendered into mutation forms.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Product(id) => id.as_str(),
            Self::Line(id) => id.as_str(),
        }
    }
}

/// Server cart operations the façade depends on.
///
/// Implemented by the platform customer client; tests substitute recording
/// fakes. The token is passed per call because it belongs to the session,
/// not the client.
#[allow(async_fn_in_trait)]
pub trait CartApi {
    async fn get_cart(&self, token: &str) -> Result<Vec<ServerCartLine>, PlatformError>;

    async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), PlatformError>;

    /// Add several lines in one request. Used by guest cart migration.
    async fn add_multiple_to_cart(
        &self,
        token: &str,
        items: &[CartItemInput],
    ) -> Result<(), PlatformError>;

    async fn update_item_quantity(
        &self,
        token: &str,
        item_id: &CartLineId,
        quantity: u32,
    ) -> Result<(), PlatformError>;

    async fn remove_item(&self, token: &str, item_id: &CartLineId) -> Result<(), PlatformError>;

    async fn clear_cart(&self, token: &str) -> Result<(), PlatformError>;
}

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Api(#[from] PlatformError),

    /// A mutation used a key form that does not match the auth state.
    #[error("line key does not match authentication state")]
    KeyMismatch,
}

/// Catalog details needed to add a line in either mode.
///
/// The guest path stores the display fields; the server path sends only the
/// product id and quantity, since the platform owns pricing.
#[derive(Debug, Clone)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: u32,
}

/// A renderable view of the cart, independent of where it lives.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    pub lines: Vec<LineSnapshot>,
}

impl CartSnapshot {
    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(LineSnapshot::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One renderable cart line plus the key that mutates it.
#[derive(Debug, Clone)]
pub struct LineSnapshot {
    pub key: LineKey,
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

impl LineSnapshot {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The auth-aware cart for one request.
///
/// Constructed per request from the session's auth state; server state is
/// fetched at most once per instance and reused across renders.
pub struct CartSession<S, A> {
    auth: CartAuth,
    local: LocalCartStore<S>,
    api: A,
    bus: EventBus,
    server_lines: Option<Vec<ServerCartLine>>,
}

impl<S: CartStorage, A: CartApi> CartSession<S, A> {
    #[must_use]
    pub fn new(auth: CartAuth, storage: S, api: A, bus: EventBus) -> Self {
        Self {
            auth,
            local: LocalCartStore::new(storage, bus.clone()),
            api,
            bus,
            server_lines: None,
        }
    }

    /// Whether the session is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.auth, CartAuth::Customer(_))
    }

    /// Type a raw form value as the mutation key for the current mode.
    #[must_use]
    pub fn line_key(&self, raw: &str) -> LineKey {
        match self.auth {
            CartAuth::Guest => LineKey::Product(ProductId::new(raw)),
            CartAuth::Customer(_) => LineKey::Line(CartLineId::new(raw)),
        }
    }

    /// Load the cart and return a renderable snapshot.
    ///
    /// Guests read session storage; customers fetch the server cart once
    /// per request. A failed fetch degrades to an empty cart after logging.
    pub async fn load(&mut self) -> CartSnapshot {
        match &self.auth {
            CartAuth::Guest => {
                self.local.initialize().await;
            }
            CartAuth::Customer(token) => {
                if self.server_lines.is_none() {
                    match self.api.get_cart(token).await {
                        Ok(lines) => self.server_lines = Some(lines),
                        Err(error) => {
                            warn!(%error, "failed to load server cart, rendering empty");
                            self.server_lines = Some(Vec::new());
                        }
                    }
                }
            }
        }

        self.snapshot()
    }

    /// Snapshot the current in-memory state without I/O.
    ///
    /// After a failed mutation this is still the pre-mutation state, which
    /// is exactly what an inline error re-render wants.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let lines = match &self.auth {
            CartAuth::Guest => self.local.lines().iter().map(local_snapshot).collect(),
            CartAuth::Customer(_) => self
                .server_lines
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(server_snapshot)
                .collect(),
        };

        CartSnapshot { lines }
    }

    /// Add a product to whichever cart is active.
    pub async fn add(&mut self, item: AddToCart) -> Result<(), CartError> {
        match &self.auth {
            CartAuth::Guest => {
                let line = LocalCartLine::new(
                    item.product_id,
                    item.title,
                    item.price,
                    item.quantity,
                    item.image,
                );
                self.local.add_item(line).await;
                Ok(())
            }
            CartAuth::Customer(token) => {
                self.api
                    .add_to_cart(token, &item.product_id, item.quantity)
                    .await?;
                // Force a refetch: the platform may have merged lines.
                self.server_lines = None;
                self.bus.publish(SessionEvent::CartChanged);
                Ok(())
            }
        }
    }

    /// Set a line's quantity. Below one removes the line instead.
    pub async fn update_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return self.remove_item(key).await;
        }

        match (&self.auth, key) {
            (CartAuth::Guest, LineKey::Product(product_id)) => {
                self.local.update_quantity(product_id, quantity).await;
                Ok(())
            }
            (CartAuth::Customer(token), LineKey::Line(item_id)) => {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                self.api
                    .update_item_quantity(token, item_id, quantity)
                    .await?;
                if let Some(lines) = self.server_lines.as_mut() {
                    if let Some(line) = lines.iter_mut().find(|line| &line.id == item_id) {
                        line.quantity = quantity;
                    }
                }
                self.bus.publish(SessionEvent::CartChanged);
                Ok(())
            }
            _ => Err(CartError::KeyMismatch),
        }
    }

    /// Remove a line.
    pub async fn remove_item(&mut self, key: &LineKey) -> Result<(), CartError> {
        match (&self.auth, key) {
            (CartAuth::Guest, LineKey::Product(product_id)) => {
                self.local.remove_item(product_id).await;
                Ok(())
            }
            (CartAuth::Customer(token), LineKey::Line(item_id)) => {
                self.api.remove_item(token, item_id).await?;
                if let Some(lines) = self.server_lines.as_mut() {
                    lines.retain(|line| &line.id != item_id);
                }
                self.bus.publish(SessionEvent::CartChanged);
                Ok(())
            }
            _ => Err(CartError::KeyMismatch),
        }
    }

    /// Empty the cart.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        match &self.auth {
            CartAuth::Guest => {
                self.local.clear().await;
                Ok(())
            }
            CartAuth::Customer(token) => {
                self.api.clear_cart(token).await?;
                self.server_lines = Some(Vec::new());
                self.bus.publish(SessionEvent::CartChanged);
                Ok(())
            }
        }
    }

    /// Promote a guest session after login and migrate the local cart.
    ///
    /// Best-effort and at-most-once: batch-add whatever the guest had, then
    /// clear local state whether or not the batch succeeded. A retry after
    /// failure could double-add lines, so dropping them is the safer
    /// outcome. Subscribers observe exactly one cart change followed by the
    /// auth change.
    pub async fn sign_in(&mut self, token: String) {
        self.local.initialize().await;

        let items: Vec<CartItemInput> = self
            .local
            .lines()
            .iter()
            .map(|line| CartItemInput {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            })
            .collect();

        if !items.is_empty() {
            if let Err(error) = self.api.add_multiple_to_cart(&token, &items).await {
                warn!(
                    %error,
                    dropped = items.len(),
                    "guest cart migration failed, dropping local lines"
                );
            }
        }

        // Always clear: removes the stored key and publishes the single
        // cart-changed event, so a second migration has nothing to move.
        self.local.clear().await;

        self.auth = CartAuth::Customer(token);
        self.server_lines = None;
        self.bus.publish(SessionEvent::AuthChanged);
    }
}

fn local_snapshot(line: &LocalCartLine) -> LineSnapshot {
    LineSnapshot {
        key: LineKey::Product(line.product_id.clone()),
        product_id: line.product_id.clone(),
        title: line.title.clone(),
        price: line.price,
        quantity: line.quantity,
        image: line.image.clone(),
    }
}

fn server_snapshot(line: &ServerCartLine) -> LineSnapshot {
    let (title, price, image) = match &line.product {
        Some(product) => (
            product.title.clone(),
            product.price,
            product.images.first().map(|image| image.url.clone()),
        ),
        None => ("Unknown product".to_string(), Decimal::ZERO, None),
    };

    LineSnapshot {
        key: LineKey::Line(line.id.clone()),
        product_id: line.product_id.clone(),
        title,
        price,
        quantity: line.quantity,
        image,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::platform::types::CartLineProduct;

    use super::*;

    fn server_line(id: &str, product_id: &str, quantity: u32, price: Decimal) -> ServerCartLine {
        ServerCartLine {
            id: CartLineId::new(id),
            product_id: ProductId::new(product_id),
            quantity,
            product: Some(CartLineProduct {
                title: format!("Product {product_id}"),
                price,
                images: vec![],
            }),
        }
    }

    #[test]
    fn test_line_key_exposes_raw_value() {
        let product = LineKey::Product(ProductId::new("p1"));
        let line = LineKey::Line(CartLineId::new("line_9"));

        assert_eq!(product.as_str(), "p1");
        assert_eq!(line.as_str(), "line_9");
    }

    #[test]
    fn test_server_snapshot_uses_embedded_product() {
        let line = server_line("line_1", "p1", 2, Decimal::new(2450, 2));
        let snapshot = server_snapshot(&line);

        assert_eq!(snapshot.key, LineKey::Line(CartLineId::new("line_1")));
        assert_eq!(snapshot.title, "Product p1");
        assert_eq!(snapshot.line_total(), Decimal::new(4900, 2));
    }

    #[test]
    fn test_server_snapshot_survives_missing_product() {
        let line = ServerCartLine {
            id: CartLineId::new("line_1"),
            product_id: ProductId::new("p1"),
            quantity: 1,
            product: None,
        };
        let snapshot = server_snapshot(&line);

        assert_eq!(snapshot.title, "Unknown product");
        assert_eq!(snapshot.price, Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_totals() {
        let lines = vec![
            server_snapshot(&server_line("l1", "p1", 3, Decimal::new(1000, 2))),
            server_snapshot(&server_line("l2", "p2", 1, Decimal::new(550, 2))),
        ];
        let snapshot = CartSnapshot { lines };

        assert_eq!(snapshot.item_count(), 4);
        assert_eq!(snapshot.subtotal(), Decimal::new(3550, 2));
        assert!(!snapshot.is_empty());
    }
}
