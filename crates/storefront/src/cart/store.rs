//! Guest cart persistence.
//!
//! Guests shop without an account, so their cart lives in the session record
//! as a JSON array of lines under [`CART_STORAGE_KEY`]. The store is
//! deliberately forgiving: corrupt JSON yields an empty cart, and storage
//! failures are logged and swallowed. Losing a guest cart must never take a
//! page down.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use vendora_core::ProductId;

use super::events::{EventBus, SessionEvent};

/// Fixed storage key for the guest cart.
pub const CART_STORAGE_KEY: &str = "vendora_cart";

/// Errors from the underlying session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend rejected the operation.
    #[error("session storage error: {0}")]
    Backend(String),
}

/// Raw string storage for the serialized guest cart.
///
/// Implementations only move strings. Parsing and the failure policy live in
/// [`LocalCartStore`], so any backend (session record, test fixture) behaves
/// identically.
#[allow(async_fn_in_trait)]
pub trait CartStorage {
    /// Read the raw serialized cart, if present.
    async fn read_raw(&self) -> Result<Option<String>, StorageError>;

    /// Write the raw serialized cart.
    async fn write_raw(&self, raw: &str) -> Result<(), StorageError>;

    /// Remove the stored cart entirely.
    async fn remove(&self) -> Result<(), StorageError>;
}

/// [`CartStorage`] backed by the request's `tower-sessions` record.
#[derive(Debug, Clone)]
pub struct SessionCartStorage {
    session: tower_sessions::Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: tower_sessions::Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn read_raw(&self) -> Result<Option<String>, StorageError> {
        self.session
            .get::<String>(CART_STORAGE_KEY)
            .await
            .map_err(|error| StorageError::Backend(error.to_string()))
    }

    async fn write_raw(&self, raw: &str) -> Result<(), StorageError> {
        self.session
            .insert(CART_STORAGE_KEY, raw)
            .await
            .map_err(|error| StorageError::Backend(error.to_string()))
    }

    async fn remove(&self) -> Result<(), StorageError> {
        self.session
            .remove::<String>(CART_STORAGE_KEY)
            .await
            .map(|_| ())
            .map_err(|error| StorageError::Backend(error.to_string()))
    }
}

/// One line of the guest cart.
///
/// Carries the catalog fields needed to render without a server round-trip.
/// Prices here are display data captured at add time; the platform reprices
/// everything if the lines ever migrate to a server cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCartLine {
    /// Locally generated line token. Never sent to the platform.
    pub id: String,
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LocalCartLine {
    /// Build a line with a fresh local id.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        price: Decimal,
        quantity: u32,
        image: Option<String>,
    ) -> Self {
        let id = format!("local_{}_{}", product_id, Uuid::new_v4());
        Self {
            id,
            product_id,
            title: title.into(),
            price,
            quantity,
            image,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The guest cart: an in-memory line list backed by session storage.
///
/// `lines` starts as `None` and is populated by [`initialize`], which makes
/// initialization observable and idempotent: exactly one storage read per
/// store, no matter how often it is called.
///
/// [`initialize`]: Self::initialize
#[derive(Debug)]
pub struct LocalCartStore<S> {
    storage: S,
    bus: EventBus,
    lines: Option<Vec<LocalCartLine>>,
}

impl<S: CartStorage> LocalCartStore<S> {
    #[must_use]
    pub const fn new(storage: S, bus: EventBus) -> Self {
        Self {
            storage,
            bus,
            lines: None,
        }
    }

    /// Load lines from storage.
    ///
    /// Idempotent: only the first call reads storage. Corrupt JSON and read
    /// failures both yield an empty cart.
    pub async fn initialize(&mut self) {
        if self.lines.is_some() {
            return;
        }

        let lines = match self.storage.read_raw().await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(%error, "stored cart is not valid JSON, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "cart storage read failed, starting empty");
                Vec::new()
            }
        };

        self.lines = Some(lines);
    }

    /// Current lines. Empty until initialized.
    #[must_use]
    pub fn lines(&self) -> &[LocalCartLine] {
        self.lines.as_deref().unwrap_or_default()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines().iter().map(|line| line.quantity).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines().iter().map(LocalCartLine::line_total).sum()
    }

    /// Add a line, merging quantities when the product is already present.
    ///
    /// A merged line keeps its original local id and display fields.
    pub async fn add_item(&mut self, line: LocalCartLine) {
        self.initialize().await;

        let lines = self.lines.get_or_insert_with(Vec::new);
        match lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => lines.push(line),
        }

        self.persist().await;
    }

    /// Remove the line for a product. Absent products leave the lines
    /// untouched, but the state is persisted either way.
    pub async fn remove_item(&mut self, product_id: &ProductId) {
        self.initialize().await;

        if let Some(lines) = self.lines.as_mut() {
            lines.retain(|line| &line.product_id != product_id);
        }

        self.persist().await;
    }

    /// Set the quantity for a product's line.
    ///
    /// Quantities below one remove the line instead; zero and negative
    /// values are removal requests, never stored quantities.
    pub async fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove_item(product_id).await;
            return;
        }

        self.initialize().await;

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(lines) = self.lines.as_mut() {
            if let Some(line) = lines
                .iter_mut()
                .find(|line| &line.product_id == product_id)
            {
                line.quantity = quantity;
            }
        }

        self.persist().await;
    }

    /// Empty the cart and delete the stored entry.
    pub async fn clear(&mut self) {
        self.lines = Some(Vec::new());

        match self.storage.remove().await {
            Ok(()) => self.bus.publish(SessionEvent::CartChanged),
            Err(error) => warn!(%error, "cart storage remove failed"),
        }
    }

    /// Serialize and write the current lines, then notify subscribers.
    ///
    /// Write failures are logged and swallowed: the in-memory lines keep the
    /// mutation, only durability and the notification are lost.
    async fn persist(&mut self) {
        let raw = match serde_json::to_string(self.lines()) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "failed to serialize cart lines");
                return;
            }
        };

        match self.storage.write_raw(&raw).await {
            Ok(()) => self.bus.publish(SessionEvent::CartChanged),
            Err(error) => warn!(%error, "cart storage write failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory [`CartStorage`] that counts operations and can be told to
    /// fail.
    #[derive(Debug, Default, Clone)]
    struct MemoryStorage {
        inner: Arc<Mutex<MemoryInner>>,
    }

    #[derive(Debug, Default)]
    struct MemoryInner {
        value: Option<String>,
        reads: usize,
        writes: usize,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MemoryStorage {
        fn with_value(raw: &str) -> Self {
            let storage = Self::default();
            storage.inner.lock().unwrap().value = Some(raw.to_string());
            storage
        }

        fn failing_reads() -> Self {
            let storage = Self::default();
            storage.inner.lock().unwrap().fail_reads = true;
            storage
        }

        fn failing_writes() -> Self {
            let storage = Self::default();
            storage.inner.lock().unwrap().fail_writes = true;
            storage
        }

        fn value(&self) -> Option<String> {
            self.inner.lock().unwrap().value.clone()
        }

        fn reads(&self) -> usize {
            self.inner.lock().unwrap().reads
        }

        fn writes(&self) -> usize {
            self.inner.lock().unwrap().writes
        }
    }

    impl CartStorage for MemoryStorage {
        async fn read_raw(&self) -> Result<Option<String>, StorageError> {
            let mut inner = self.inner.lock().unwrap();
            inner.reads += 1;
            if inner.fail_reads {
                return Err(StorageError::Backend("read refused".to_string()));
            }
            Ok(inner.value.clone())
        }

        async fn write_raw(&self, raw: &str) -> Result<(), StorageError> {
            let mut inner = self.inner.lock().unwrap();
            inner.writes += 1;
            if inner.fail_writes {
                return Err(StorageError::Backend("write refused".to_string()));
            }
            inner.value = Some(raw.to_string());
            Ok(())
        }

        async fn remove(&self) -> Result<(), StorageError> {
            let mut inner = self.inner.lock().unwrap();
            inner.value = None;
            Ok(())
        }
    }

    fn line(product_id: &str, quantity: u32) -> LocalCartLine {
        LocalCartLine::new(
            ProductId::new(product_id),
            format!("Product {product_id}"),
            Decimal::new(1000, 2), // 10.00
            quantity,
            None,
        )
    }

    #[tokio::test]
    async fn test_initialize_reads_storage_exactly_once() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage.clone(), EventBus::new());

        store.initialize().await;
        store.initialize().await;
        store.initialize().await;

        assert_eq!(storage.reads(), 1);
    }

    #[tokio::test]
    async fn test_add_item_merges_quantities_for_same_product() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage.clone(), EventBus::new());

        store.add_item(line("p1", 2)).await;
        store.add_item(line("p1", 3)).await;

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines().first().unwrap().quantity, 5);

        // The persisted JSON holds the single merged line.
        let stored: Vec<LocalCartLine> =
            serde_json::from_str(&storage.value().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.first().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_add_item_keeps_distinct_products_separate() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage, EventBus::new());

        store.add_item(line("p1", 1)).await;
        store.add_item(line("p2", 4)).await;

        assert_eq!(store.lines().len(), 2);
        assert_eq!(store.item_count(), 5);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage, EventBus::new());
        let product = ProductId::new("p1");

        store.add_item(line("p1", 2)).await;
        store.update_quantity(&product, 0).await;

        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_negative_removes_line() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage, EventBus::new());
        let product = ProductId::new("p1");

        store.add_item(line("p1", 2)).await;
        store.update_quantity(&product, -5).await;

        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_sets_positive_value() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage, EventBus::new());
        let product = ProductId::new("p1");

        store.add_item(line("p1", 2)).await;
        store.update_quantity(&product, 7).await;

        assert_eq!(store.lines().first().unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_corrupt_json_yields_empty_cart() {
        let storage = MemoryStorage::with_value("{not json");
        let mut store = LocalCartStore::new(storage, EventBus::new());

        store.initialize().await;

        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_yields_empty_cart() {
        let storage = MemoryStorage::failing_reads();
        let mut store = LocalCartStore::new(storage, EventBus::new());

        store.initialize().await;

        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state_and_skips_event() {
        let storage = MemoryStorage::failing_writes();
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut store = LocalCartStore::new(storage.clone(), bus);

        store.add_item(line("p1", 2)).await;

        // The mutation survives in memory even though the write failed.
        assert_eq!(store.item_count(), 2);
        assert_eq!(storage.writes(), 1);
        assert!(storage.value().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_mutations_publish_cart_changed() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let mut store = LocalCartStore::new(MemoryStorage::default(), bus);
        let product = ProductId::new("p1");

        store.add_item(line("p1", 1)).await;
        store.update_quantity(&product, 3).await;
        store.remove_item(&product).await;

        for _ in 0..3 {
            assert_eq!(rx.try_recv().unwrap(), SessionEvent::CartChanged);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_removes_stored_entry() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage.clone(), EventBus::new());

        store.add_item(line("p1", 2)).await;
        assert!(storage.value().is_some());

        store.clear().await;

        assert!(store.lines().is_empty());
        assert!(storage.value().is_none());
    }

    #[tokio::test]
    async fn test_subtotal_multiplies_price_by_quantity() {
        let storage = MemoryStorage::default();
        let mut store = LocalCartStore::new(storage, EventBus::new());

        store.add_item(line("p1", 3)).await;

        // Three units at 10.00 each.
        assert_eq!(store.subtotal(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_local_line_ids_are_unique_per_line() {
        let a = line("p1", 1);
        let b = line("p1", 1);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("local_p1_"));
    }
}
