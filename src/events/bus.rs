//! Typed publish/subscribe fan-out.
//!
//! [`EventBus`] is used twice: once as the ambient broadcast channel shared
//! by every store (`EventBus<AppEvent>`), and once inside each store as its
//! own subscriber list (`EventBus<Snapshot>`).
//!
//! Delivery is synchronous and fire-and-forget. The subscriber list is copied
//! out of the lock before delivery, so a subscriber may subscribe or
//! unsubscribe from inside its callback. A panicking subscriber is caught and
//! logged; the remaining subscribers still receive the event.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A typed publish/subscribe bus.
pub struct EventBus<E> {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<E> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for every subsequent event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push((id, Arc::new(callback))),
            Err(e) => tracing::error!(error = %e, "subscriber list poisoned, subscription dropped"),
        }
        id
    }

    /// Removes a subscription. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Delivers `event` to every subscriber. Returns how many subscribers
    /// handled it without panicking.
    pub fn publish(&self, event: &E) -> usize {
        let callbacks: Vec<(SubscriptionId, Callback<E>)> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers.clone(),
            Err(e) => {
                tracing::error!(error = %e, "subscriber list poisoned, event dropped");
                return 0;
            }
        };

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!(subscription = ?id, "subscriber panicked while handling event");
                }
            }
        }
        delivered
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
