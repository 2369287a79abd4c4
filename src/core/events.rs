//! In-process publish/subscribe event bus (C9, spec.md §4.9).
//!
//! Each subscriber gets a bounded channel. Publication is best-effort and
//! non-blocking from the publisher's perspective: a full or closed
//! subscriber queue is skipped and logged, never allowed to stall or
//! interrupt the fan-out to the remaining subscribers (spec.md §5).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::event::BusEvent;

pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

pub type SubscriberId = u64;

/// Explicit registry value passed by reference — no hidden module state
/// (spec.md §9).
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<BusEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its id plus the receiving end of
    /// its bounded queue.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<BusEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.insert(id, tx);
        debug!(subscriber_id = id, total = subscribers.len(), "subscriber added");
        (id, rx)
    }

    /// Detach a subscriber's queue, discarding any unread items. Tolerates
    /// being called concurrently with an in-flight `publish`.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.lock().unwrap().remove(&id);
    }

    /// Fan an event out to every live subscriber. Full or closed queues are
    /// skipped without blocking or affecting delivery to the rest.
    pub fn publish(&self, event: BusEvent) {
        let subscribers = self.subscribers.lock().unwrap();
        for (id, tx) in subscribers.iter() {
            if let Err(err) = tx.try_send(event.clone()) {
                warn!(subscriber_id = id, %err, "dropping event for subscriber");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;

    fn event() -> BusEvent {
        BusEvent {
            entity_id: Some("e1".to_string()),
            event_type: EventType::Track,
            data: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let (_id1, mut rx1) = bus.subscribe();
        let (_id2, mut rx2) = bus.subscribe();

        bus.publish(event());

        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn unsubscribe_removes_queue_and_tolerates_concurrent_publish() {
        let bus = EventBus::new();
        let (id, mut rx) = bus.subscribe();
        bus.unsubscribe(id);

        bus.publish(event());
        assert!(rx.recv().await.is_none());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn full_queue_is_skipped_without_blocking() {
        let bus = EventBus::new();
        let (_id, _rx) = bus.subscribe();

        for _ in 0..(SUBSCRIBER_QUEUE_CAPACITY + 10) {
            bus.publish(event());
        }
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn subscriber_count_reflects_registrations() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        let (_id, _rx) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
