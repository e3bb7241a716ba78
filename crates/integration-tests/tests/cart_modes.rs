//! Dual-mode cart routing.
//!
//! Guests mutate session storage with zero platform traffic; signed-in
//! customers mutate the server cart by line id with zero storage traffic.
//! The façade presents one surface over both, so these tests drive it
//! through each mode and assert on the recorded backend calls.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use vendora_integration_tests::{ApiCall, MemoryStorage, RecordingCartApi, add_request, server_line};
use vendora_storefront::cart::{
    CartAuth, CartError, CartSession, EventBus, LineKey, SessionEvent,
};

fn guest_session(
    storage: &MemoryStorage,
    api: &RecordingCartApi,
    bus: &EventBus,
) -> CartSession<MemoryStorage, RecordingCartApi> {
    CartSession::new(CartAuth::Guest, storage.clone(), api.clone(), bus.clone())
}

fn customer_session(
    token: &str,
    storage: &MemoryStorage,
    api: &RecordingCartApi,
    bus: &EventBus,
) -> CartSession<MemoryStorage, RecordingCartApi> {
    CartSession::new(
        CartAuth::Customer(token.to_string()),
        storage.clone(),
        api.clone(),
        bus.clone(),
    )
}

// =============================================================================
// Guest Mode
// =============================================================================

#[tokio::test]
async fn test_guest_flow_never_touches_the_platform() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    cart.add(add_request("p1", 2)).await.unwrap();
    cart.add(add_request("p2", 1)).await.unwrap();

    let key = cart.line_key("p1");
    cart.update_quantity(&key, 5).await.unwrap();
    cart.remove_item(&key).await.unwrap();

    assert!(api.calls().is_empty());
    assert!(storage.writes() >= 4);

    let snapshot = cart.snapshot();
    assert_eq!(snapshot.item_count(), 1);
}

#[tokio::test]
async fn test_guest_cart_survives_across_requests() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();

    // First request adds; second request reads the same session storage.
    let mut first = guest_session(&storage, &api, &bus);
    first.add(add_request("p1", 2)).await.unwrap();
    first.add(add_request("p2", 3)).await.unwrap();

    let mut second = guest_session(&storage, &api, &bus);
    let snapshot = second.load().await;

    assert_eq!(snapshot.item_count(), 5);
    assert_eq!(snapshot.subtotal(), Decimal::new(5000, 2));
}

#[tokio::test]
async fn test_guest_repeat_add_merges_by_product() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    cart.add(add_request("p1", 2)).await.unwrap();
    cart.add(add_request("p1", 3)).await.unwrap();

    let snapshot = cart.snapshot();
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.item_count(), 5);
}

#[tokio::test]
async fn test_guest_storage_format_is_stable() {
    // Stored lines outlive deploys; a format change silently empties every
    // open guest cart.
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    cart.add(add_request("p1", 2)).await.unwrap();

    let raw = storage.value().unwrap();
    let lines: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let line = lines.pointer("/0").unwrap();
    assert_eq!(line.get("product_id").and_then(serde_json::Value::as_str), Some("p1"));
    assert_eq!(line.get("quantity").and_then(serde_json::Value::as_u64), Some(2));
    assert_eq!(line.get("price").and_then(serde_json::Value::as_str), Some("10.00"));
    // Absent images are skipped, not serialized as null.
    assert!(line.get("image").is_none());
}

#[tokio::test]
async fn test_guest_read_failure_degrades_to_an_empty_cart() {
    let storage = MemoryStorage::failing_reads();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    let snapshot = cart.load().await;
    assert!(snapshot.is_empty());

    // The shopper can keep adding; the session just starts over.
    cart.add(add_request("p1", 1)).await.unwrap();
    assert_eq!(cart.snapshot().item_count(), 1);
}

#[tokio::test]
async fn test_guest_corrupt_storage_degrades_to_an_empty_cart() {
    let storage = MemoryStorage::with_value("{not json");
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    assert!(cart.load().await.is_empty());

    // The next write replaces the corrupt entry.
    cart.add(add_request("p1", 1)).await.unwrap();
    let mut fresh = guest_session(&storage, &api, &EventBus::new());
    assert_eq!(fresh.load().await.item_count(), 1);
}

#[tokio::test]
async fn test_guest_write_failure_keeps_the_mutation_in_memory() {
    let storage = MemoryStorage::failing_writes();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let mut cart = guest_session(&storage, &api, &bus);

    cart.add(add_request("p1", 2)).await.unwrap();

    // This request still renders the updated cart, but nothing was
    // persisted and nobody was told to re-render.
    assert_eq!(cart.snapshot().item_count(), 2);
    assert!(storage.value().is_none());
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// Customer Mode
// =============================================================================

#[tokio::test]
async fn test_customer_flow_routes_by_line_id() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::with_server_lines(vec![server_line(
        "line_1",
        "p1",
        2,
        Decimal::new(1000, 2),
    )]);
    let mut cart = customer_session("tok_abc", &storage, &api, &EventBus::new());

    let snapshot = cart.load().await;
    assert_eq!(snapshot.item_count(), 2);

    let key = snapshot.lines.first().unwrap().key.clone();
    cart.update_quantity(&key, 5).await.unwrap();
    cart.remove_item(&key).await.unwrap();
    cart.clear().await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::GetCart,
            ApiCall::UpdateQuantity {
                item_id: "line_1".to_string(),
                quantity: 5,
            },
            ApiCall::Remove {
                item_id: "line_1".to_string(),
            },
            ApiCall::Clear,
        ]
    );
    assert!(api.tokens().iter().all(|token| token == "tok_abc"));

    // The session record is never involved for a signed-in customer.
    assert_eq!(storage.reads(), 0);
    assert_eq!(storage.writes(), 0);
}

#[tokio::test]
async fn test_customer_load_fetches_once_per_request() {
    let api = RecordingCartApi::with_server_lines(vec![server_line(
        "line_1",
        "p1",
        1,
        Decimal::new(500, 2),
    )]);
    let mut cart = customer_session("tok", &MemoryStorage::default(), &api, &EventBus::new());

    cart.load().await;
    cart.load().await;

    assert_eq!(api.calls(), vec![ApiCall::GetCart]);
}

#[tokio::test]
async fn test_customer_add_forces_refetch() {
    let api = RecordingCartApi::default();
    let mut cart = customer_session("tok", &MemoryStorage::default(), &api, &EventBus::new());

    cart.load().await;
    cart.add(add_request("p1", 1)).await.unwrap();
    cart.load().await;

    // The platform may merge the new line into an existing one, so the
    // façade refetches instead of guessing.
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::GetCart,
            ApiCall::Add {
                product_id: "p1".to_string(),
                quantity: 1,
            },
            ApiCall::GetCart,
        ]
    );
}

#[tokio::test]
async fn test_failed_server_fetch_renders_empty_cart() {
    let api = RecordingCartApi::failing_get_cart();
    let mut cart = customer_session("tok", &MemoryStorage::default(), &api, &EventBus::new());

    let snapshot = cart.load().await;

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.subtotal(), Decimal::ZERO);
}

// =============================================================================
// Shared Semantics
// =============================================================================

#[tokio::test]
async fn test_quantity_below_one_removes_in_both_modes() {
    // Guest: a zero-quantity update deletes the line from storage.
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut guest = guest_session(&storage, &api, &EventBus::new());
    guest.add(add_request("p1", 2)).await.unwrap();
    let key = guest.line_key("p1");
    guest.update_quantity(&key, 0).await.unwrap();
    assert!(guest.snapshot().is_empty());

    // Customer: a negative update becomes a remove call, never a stored
    // quantity.
    let api = RecordingCartApi::with_server_lines(vec![server_line(
        "line_1",
        "p1",
        2,
        Decimal::new(1000, 2),
    )]);
    let mut customer = customer_session("tok", &MemoryStorage::default(), &api, &EventBus::new());
    customer.load().await;
    let key = customer.line_key("line_1");
    customer.update_quantity(&key, -3).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::GetCart,
            ApiCall::Remove {
                item_id: "line_1".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_line_keys_follow_auth_state() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();

    let guest = guest_session(&storage, &api, &bus);
    assert!(matches!(guest.line_key("p1"), LineKey::Product(_)));

    let customer = customer_session("tok", &storage, &api, &bus);
    assert!(matches!(customer.line_key("line_1"), LineKey::Line(_)));
}

#[tokio::test]
async fn test_mismatched_keys_are_rejected_not_guessed() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();

    // A server line key presented to a guest cart.
    let mut guest = guest_session(&storage, &api, &bus);
    guest.add(add_request("p1", 1)).await.unwrap();
    let writes_before = storage.writes();
    let server_key = LineKey::Line(vendora_core::CartLineId::new("line_1"));
    assert!(matches!(
        guest.update_quantity(&server_key, 3).await,
        Err(CartError::KeyMismatch)
    ));

    // And a product key presented to a customer cart.
    let mut customer = customer_session("tok", &storage, &api, &bus);
    let product_key = LineKey::Product(vendora_core::ProductId::new("p1"));
    assert!(matches!(
        customer.remove_item(&product_key).await,
        Err(CartError::KeyMismatch)
    ));

    // Rejected mutations leave both backends untouched.
    assert_eq!(storage.writes(), writes_before);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_customer_mutations_broadcast_payload_free_changes() {
    let api = RecordingCartApi::with_server_lines(vec![server_line(
        "line_1",
        "p1",
        1,
        Decimal::new(1000, 2),
    )]);
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let mut cart = customer_session("tok", &MemoryStorage::default(), &api, &bus);

    cart.load().await;
    cart.add(add_request("p2", 1)).await.unwrap();
    let key = cart.line_key("line_1");
    cart.update_quantity(&key, 4).await.unwrap();
    cart.remove_item(&key).await.unwrap();
    cart.clear().await.unwrap();

    // One change notification per mutation; loads notify nobody.
    for _ in 0..4 {
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CartChanged);
    }
    assert!(rx.try_recv().is_err());
}
