//! Integration tests for Vendora.
//!
//! Exercises cross-module flows that unit tests cover only in isolation,
//! chiefly the auth-aware cart façade end to end: guest persistence, the
//! one-time migration at sign-in, and routing between session storage and
//! the platform cart API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vendora-integration-tests
//! ```
//!
//! No servers or databases are involved: the façade runs against the
//! recording fakes in this crate, which stand in for session storage and
//! the platform customer client.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;

use vendora_core::{CartLineId, ProductId};
use vendora_storefront::cart::{AddToCart, CartApi, CartStorage, StorageError};
use vendora_storefront::platform::PlatformError;
use vendora_storefront::platform::types::{CartItemInput, CartLineProduct, ServerCartLine};

// =============================================================================
// Storage Fake
// =============================================================================

/// In-memory [`CartStorage`] that counts operations and can be told to fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
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
    #[must_use]
    pub fn with_value(raw: &str) -> Self {
        let storage = Self::default();
        storage.lock().value = Some(raw.to_string());
        storage
    }

    #[must_use]
    pub fn failing_reads() -> Self {
        let storage = Self::default();
        storage.lock().fail_reads = true;
        storage
    }

    #[must_use]
    pub fn failing_writes() -> Self {
        let storage = Self::default();
        storage.lock().fail_writes = true;
        storage
    }

    /// The raw stored value, if any.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        self.lock().value.clone()
    }

    /// Number of reads served (including failed ones).
    #[must_use]
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Number of writes attempted (including failed ones).
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    async fn read_raw(&self) -> Result<Option<String>, StorageError> {
        let mut inner = self.lock();
        inner.reads += 1;
        if inner.fail_reads {
            return Err(StorageError::Backend("read refused".to_string()));
        }
        Ok(inner.value.clone())
    }

    async fn write_raw(&self, raw: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.writes += 1;
        if inner.fail_writes {
            return Err(StorageError::Backend("write refused".to_string()));
        }
        inner.value = Some(raw.to_string());
        Ok(())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        self.lock().value = None;
        Ok(())
    }
}

// =============================================================================
// Platform API Fake
// =============================================================================

/// One recorded call against [`RecordingCartApi`], without its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetCart,
    Add { product_id: String, quantity: u32 },
    BatchAdd { items: Vec<(String, u32)> },
    UpdateQuantity { item_id: String, quantity: u32 },
    Remove { item_id: String },
    Clear,
}

/// Recording [`CartApi`] fake.
///
/// Records every call with its token, serves a configured set of server
/// lines from `get_cart`, and can be told to fail specific operations. It
/// deliberately does not simulate the platform: assertions are on the
/// recorded traffic, not on emergent state.
#[derive(Debug, Default, Clone)]
pub struct RecordingCartApi {
    inner: Arc<Mutex<ApiInner>>,
}

#[derive(Debug, Default)]
struct ApiInner {
    calls: Vec<(String, ApiCall)>,
    server_lines: Vec<ServerCartLine>,
    fail_get_cart: bool,
    fail_batch_add: bool,
}

impl RecordingCartApi {
    #[must_use]
    pub fn with_server_lines(lines: Vec<ServerCartLine>) -> Self {
        let api = Self::default();
        api.lock().server_lines = lines;
        api
    }

    #[must_use]
    pub fn failing_get_cart() -> Self {
        let api = Self::default();
        api.lock().fail_get_cart = true;
        api
    }

    #[must_use]
    pub fn failing_batch_add() -> Self {
        let api = Self::default();
        api.lock().fail_batch_add = true;
        api
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.iter().map(|(_, call)| call.clone()).collect()
    }

    /// Tokens presented so far, one per call, in order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(token, _)| token.clone()).collect()
    }

    fn record(&self, token: &str, call: ApiCall) {
        self.lock().calls.push((token.to_string(), call));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ApiInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn injected_failure() -> PlatformError {
        PlatformError::Api {
            status: 500,
            message: "injected failure".to_string(),
        }
    }
}

impl CartApi for RecordingCartApi {
    async fn get_cart(&self, token: &str) -> Result<Vec<ServerCartLine>, PlatformError> {
        self.record(token, ApiCall::GetCart);
        let inner = self.lock();
        if inner.fail_get_cart {
            return Err(Self::injected_failure());
        }
        Ok(inner.server_lines.clone())
    }

    async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), PlatformError> {
        self.record(
            token,
            ApiCall::Add {
                product_id: product_id.as_str().to_string(),
                quantity,
            },
        );
        Ok(())
    }

    async fn add_multiple_to_cart(
        &self,
        token: &str,
        items: &[CartItemInput],
    ) -> Result<(), PlatformError> {
        self.record(
            token,
            ApiCall::BatchAdd {
                items: items
                    .iter()
                    .map(|item| (item.product_id.as_str().to_string(), item.quantity))
                    .collect(),
            },
        );
        if self.lock().fail_batch_add {
            return Err(Self::injected_failure());
        }
        Ok(())
    }

    async fn update_item_quantity(
        &self,
        token: &str,
        item_id: &CartLineId,
        quantity: u32,
    ) -> Result<(), PlatformError> {
        self.record(
            token,
            ApiCall::UpdateQuantity {
                item_id: item_id.as_str().to_string(),
                quantity,
            },
        );
        Ok(())
    }

    async fn remove_item(&self, token: &str, item_id: &CartLineId) -> Result<(), PlatformError> {
        self.record(
            token,
            ApiCall::Remove {
                item_id: item_id.as_str().to_string(),
            },
        );
        Ok(())
    }

    async fn clear_cart(&self, token: &str) -> Result<(), PlatformError> {
        self.record(token, ApiCall::Clear);
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A server cart line with an embedded catalog snapshot.
#[must_use]
pub fn server_line(id: &str, product_id: &str, quantity: u32, price: Decimal) -> ServerCartLine {
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

/// An add request at 10.00 a unit.
#[must_use]
pub fn add_request(product_id: &str, quantity: u32) -> AddToCart {
    AddToCart {
        product_id: ProductId::new(product_id),
        title: format!("Product {product_id}"),
        price: Decimal::new(1000, 2),
        image: None,
        quantity,
    }
}
