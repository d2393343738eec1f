//! Eviction observer registry.
//!
//! Observers are plain callbacks `Fn(&LruCache<K, V>, &K)`. They are kept in
//! registration order and each one is called once per evicted key.
//!
//! ```text
//!   subscribe(f1) ─► id 0 ┐
//!   subscribe(f2) ─► id 1 ├─► [ (0, f1), (1, f2), (2, f3) ]
//!   subscribe(f3) ─► id 2 ┘            │
//!                                      ▼ evict("k")
//!                        f1(cache, "k"), f2(cache, "k"), f3(cache, "k")
//! ```
//!
//! Delivery works on a snapshot of the list, taken under a short read lock, so
//! an observer may subscribe or unsubscribe while it runs. Changes take
//! effect from the next eviction.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::LruCache;

/// Callback invoked with the cache and the key it just evicted.
pub type EvictionObserver<K, V> = Arc<dyn Fn(&LruCache<K, V>, &K) + Send + Sync>;

/// Handle returned by [`LruCache::subscribe`]; pass it to
/// [`LruCache::unsubscribe`] to stop receiving notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Ordered set of eviction observers.
pub struct EvictionObservers<K, V> {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<(SubscriptionId, EvictionObserver<K, V>)>>,
}

impl<K, V> EvictionObservers<K, V> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Appends an observer; it runs after every observer registered before it.
    pub fn subscribe(&self, observer: EvictionObserver<K, V>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, observer));
        trace!(subscription = id.get(), "eviction observer subscribed");
        id
    }

    /// Removes an observer; returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(pos) = subscribers.iter().position(|(sub, _)| *sub == id) else {
            return false;
        };
        subscribers.remove(pos);
        trace!(subscription = id.get(), "eviction observer unsubscribed");
        true
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Calls every observer with `(cache, key)` in registration order and
    /// returns how many were called.
    pub fn notify(&self, cache: &LruCache<K, V>, key: &K) -> usize {
        let snapshot: Vec<EvictionObserver<K, V>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in &snapshot {
            observer(cache, key);
        }
        snapshot.len()
    }
}

impl<K, V> Default for EvictionObservers<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for EvictionObservers<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionObservers")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
