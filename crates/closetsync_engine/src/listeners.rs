//! Synchronous change notification.
//!
//! The listener layer is a plain observer list: callbacks registered
//! under stable ids, invoked synchronously on every local mutation and
//! on sync-status transitions. It deliberately is not an event-emitter
//! or channel type — subscribers see events on the mutating call stack,
//! before the mutation's caller regains control.

use closetsync_types::EntityKey;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A change observed on the hybrid store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// An entity was written. `value` is the full new value.
    Changed {
        /// Which entity changed.
        key: EntityKey,
        /// The value just written.
        value: Value,
    },
    /// An entity was removed from the local cache.
    Removed {
        /// Which entity was removed.
        key: EntityKey,
    },
    /// A sync cycle began (`active`) or ended (`!active`).
    SyncStatus {
        /// Whether a sync is now in progress.
        active: bool,
    },
}

/// Stable handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// A set of change listeners with stable, idempotent unsubscribe.
///
/// Notification happens under a read lock on the listener table, so
/// callbacks must not subscribe or unsubscribe from within a
/// notification.
#[derive(Default)]
pub struct ListenerSet {
    listeners: RwLock<HashMap<u64, Callback>>,
    next_id: AtomicU64,
}

impl ListenerSet {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` and returns its handle.
    pub fn subscribe(&self, callback: impl Fn(&StoreEvent) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.write().insert(id, Box::new(callback));
        ListenerId(id)
    }

    /// Removes the listener behind `id`. Unsubscribing an already-removed
    /// listener is a no-op and never affects other subscribers.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.write().remove(&id.0);
    }

    /// Invokes every registered listener with `event`, synchronously.
    pub fn notify(&self, event: &StoreEvent) {
        for callback in self.listeners.read().values() {
            callback(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}
