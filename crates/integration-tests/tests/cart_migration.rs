//! Guest cart migration at sign-in.
//!
//! When a guest signs in, the façade batch-adds the local lines to the
//! server cart exactly once, then clears local state whether or not the
//! batch landed. These tests pin down the at-most-once contract, the event
//! sequence, and the handoff to server routing afterwards.

#![allow(clippy::unwrap_used)]

use vendora_integration_tests::{ApiCall, MemoryStorage, RecordingCartApi, add_request};
use vendora_storefront::cart::{CartAuth, CartSession, EventBus, SessionEvent};

fn guest_session(
    storage: &MemoryStorage,
    api: &RecordingCartApi,
    bus: &EventBus,
) -> CartSession<MemoryStorage, RecordingCartApi> {
    CartSession::new(CartAuth::Guest, storage.clone(), api.clone(), bus.clone())
}

#[tokio::test]
async fn test_sign_in_batches_local_lines_in_one_call() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    // Two adds of the same product merge before migration.
    cart.add(add_request("p1", 1)).await.unwrap();
    cart.add(add_request("p1", 1)).await.unwrap();
    cart.add(add_request("p2", 1)).await.unwrap();

    cart.sign_in("tok_new".to_string()).await;

    assert_eq!(
        api.calls(),
        vec![ApiCall::BatchAdd {
            items: vec![("p1".to_string(), 2), ("p2".to_string(), 1)],
        }]
    );
    assert_eq!(api.tokens(), vec!["tok_new".to_string()]);
    assert!(cart.is_authenticated());

    // Local state is gone; nothing is left to migrate again.
    assert!(storage.value().is_none());
}

#[tokio::test]
async fn test_sign_in_with_empty_cart_skips_the_batch() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    cart.sign_in("tok".to_string()).await;

    assert!(api.calls().is_empty());
    assert!(cart.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_emits_one_cart_change_then_the_auth_change() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();
    let mut cart = guest_session(&storage, &api, &bus);

    cart.add(add_request("p1", 2)).await.unwrap();

    // Subscribe after setup so only the sign-in events are observed.
    let mut rx = bus.subscribe();
    cart.sign_in("tok".to_string()).await;

    assert_eq!(rx.try_recv().unwrap(), SessionEvent::CartChanged);
    assert_eq!(rx.try_recv().unwrap(), SessionEvent::AuthChanged);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_migration_drops_lines_instead_of_retrying() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::failing_batch_add();

    // A first session builds the guest cart and signs in; the batch fails.
    let mut first = guest_session(&storage, &api, &EventBus::new());
    first.add(add_request("p1", 2)).await.unwrap();
    first.sign_in("tok".to_string()).await;

    assert_eq!(
        api.calls(),
        vec![ApiCall::BatchAdd {
            items: vec![("p1".to_string(), 2)],
        }]
    );
    assert!(first.is_authenticated());
    // The local lines are dropped, not kept for a retry that could
    // double-add them.
    assert!(storage.value().is_none());

    // A later sign-in over the same session storage finds nothing to move.
    let mut second = guest_session(&storage, &api, &EventBus::new());
    second.sign_in("tok".to_string()).await;

    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_after_sign_in_mutations_route_to_the_server() {
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let mut cart = guest_session(&storage, &api, &EventBus::new());

    cart.add(add_request("p1", 1)).await.unwrap();
    cart.sign_in("tok".to_string()).await;
    let writes_after_sign_in = storage.writes();

    cart.add(add_request("p2", 4)).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            ApiCall::BatchAdd {
                items: vec![("p1".to_string(), 1)],
            },
            ApiCall::Add {
                product_id: "p2".to_string(),
                quantity: 4,
            },
        ]
    );
    assert_eq!(storage.writes(), writes_after_sign_in);
}

#[tokio::test]
async fn test_sign_in_reads_storage_when_cart_was_never_loaded() {
    // Sign-in can happen before any cart page was rendered this request, so
    // the migration itself must pull the stored lines.
    let storage = MemoryStorage::default();
    let api = RecordingCartApi::default();
    let bus = EventBus::new();

    let mut earlier = guest_session(&storage, &api, &bus);
    earlier.add(add_request("p1", 3)).await.unwrap();

    let mut login_request = guest_session(&storage, &api, &bus);
    login_request.sign_in("tok".to_string()).await;

    assert_eq!(
        api.calls(),
        vec![ApiCall::BatchAdd {
            items: vec![("p1".to_string(), 3)],
        }]
    );
}
