//! Library-change notifications
//!
//! In-process fan-out from whoever mutates the catalog (the scanner) to the
//! screens that display it. Subscriptions are tied to the subscriber's
//! lifetime: dropping the handle unsubscribes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

/// What changed in the library. Coarse on purpose: subscribers re-enumerate
/// rather than patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryChange {
    AssetsChanged,
}

/// Fan-out point for [`LibraryChange`] events.
pub struct ChangeHub {
    subscribers: Mutex<HashMap<u64, Sender<LibraryChange>>>,
    next_id: AtomicU64,
}

impl ChangeHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    /// Register a subscriber. The returned handle unsubscribes on drop.
    pub fn subscribe(self: &Arc<Self>) -> ChangeSubscription {
        let (tx, rx) = channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().insert(id, tx);
        ChangeSubscription {
            id,
            hub: Arc::clone(self),
            rx,
        }
    }

    /// Deliver a change to every live subscriber.
    pub fn post(&self, change: LibraryChange) {
        let subscribers = self.subscribers.lock().unwrap();
        for tx in subscribers.values() {
            tx.send(change).ok();
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().unwrap().remove(&id);
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

/// A live registration with a [`ChangeHub`].
pub struct ChangeSubscription {
    id: u64,
    hub: Arc<ChangeHub>,
    rx: Receiver<LibraryChange>,
}

impl ChangeSubscription {
    /// Non-blocking poll for the next pending change.
    pub fn try_recv(&self) -> Option<LibraryChange> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drop pending events, keeping at most the fact that something changed.
    /// Returns true if at least one change was pending.
    pub fn drain(&self) -> bool {
        let mut any = false;
        while self.try_recv().is_some() {
            any = true;
        }
        any
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posted_changes_reach_subscribers() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe();

        hub.post(LibraryChange::AssetsChanged);

        assert_eq!(sub.try_recv(), Some(LibraryChange::AssetsChanged));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn drain_collapses_bursts() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe();

        hub.post(LibraryChange::AssetsChanged);
        hub.post(LibraryChange::AssetsChanged);
        hub.post(LibraryChange::AssetsChanged);

        assert!(sub.drain());
        assert!(!sub.drain());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);

        // Posting with no subscribers is a no-op
        hub.post(LibraryChange::AssetsChanged);
    }
}
