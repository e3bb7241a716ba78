//! Session-scoped change notifications.
//!
//! Cart and auth mutations publish a zero-payload event on the session's
//! bus; anything rendering cart state subscribes and re-reads on receipt.
//! Events deliberately carry no data: subscribers always refetch, so a
//! coalesced or missed event can never show stale contents.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

/// Capacity of each per-session broadcast channel.
///
/// A subscriber that falls behind observes `Lagged` and simply re-reads;
/// nothing is lost because events carry no payload.
const CHANNEL_CAPACITY: usize = 16;

/// A change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Cart contents changed; re-read before rendering.
    CartChanged,
    /// Authentication state changed (login or logout).
    AuthChanged,
}

/// Broadcast channel for one session's events.
///
/// Cloning is cheap and clones share the channel, so publishers and
/// subscribers across concurrent requests see each other.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A send error only means nobody is subscribed right now, which is
    /// normal for sessions without an open cart view.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of per-session event buses.
///
/// Concurrent requests for the same session must share one channel, so the
/// hub hands out clones keyed by a stable session key. Entries are removed
/// on logout; everything else lives for the life of the process, same as
/// the in-memory session store.
#[derive(Debug, Default)]
pub struct SessionEventHub {
    buses: Mutex<HashMap<String, EventBus>>,
}

impl SessionEventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bus for a session, creating it on first use.
    pub fn bus(&self, session_key: &str) -> EventBus {
        let mut buses = self.buses.lock().unwrap_or_else(PoisonError::into_inner);
        buses.entry(session_key.to_string()).or_default().clone()
    }

    /// Drop a session's bus. Called on logout.
    pub fn remove(&self, session_key: &str) {
        let mut buses = self.buses.lock().unwrap_or_else(PoisonError::into_inner);
        buses.remove(session_key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(SessionEvent::CartChanged);
        bus.publish(SessionEvent::AuthChanged);

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CartChanged);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::AuthChanged);
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(SessionEvent::CartChanged);
    }

    #[test]
    fn test_hub_shares_one_bus_per_session() {
        let hub = SessionEventHub::new();

        // Subscribe through one handle, publish through another.
        let mut rx = hub.bus("session-a").subscribe();
        hub.bus("session-a").publish(SessionEvent::CartChanged);

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::CartChanged);
    }

    #[test]
    fn test_hub_isolates_sessions() {
        let hub = SessionEventHub::new();

        let mut rx_a = hub.bus("session-a").subscribe();
        hub.bus("session-b").publish(SessionEvent::CartChanged);

        assert_eq!(rx_a.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[test]
    fn test_remove_detaches_future_publishers() {
        let hub = SessionEventHub::new();

        let mut rx = hub.bus("session-a").subscribe();
        hub.remove("session-a");

        // A new bus is created for the key; the old subscriber is orphaned.
        hub.bus("session-a").publish(SessionEvent::CartChanged);
        assert!(rx.try_recv().is_err());
    }
}
