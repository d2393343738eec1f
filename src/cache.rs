//! # Thread-safe LRU Cache
//!
//! [`LruCache`] wraps an [`LruCore`] in a single `parking_lot::Mutex` and adds
//! multicast eviction notification.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V>                           │
//!   │                                                                  │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │  Mutex<LruCore<K, V>>                                    │   │
//!   │   │    index (FxHashMap)  +  recency order (IntrusiveList)   │   │
//!   │   └──────────────────────────────────────────────────────────┘   │
//!   │                                                                  │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │  EvictionObservers<K, V>   (own RwLock, snapshot on use) │   │
//!   │   └──────────────────────────────────────────────────────────┘   │
//!   │                                                                  │
//!   │   notify_mode: UnderLock | AfterUnlock                           │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! Every operation, including `try_get_value` and `count`, takes the one
//! mutex for its whole duration, so the index and the recency order are
//! never observed out of step. Lookups need exclusive access anyway because a
//! hit moves the key in the recency order.
//!
//! ```text
//!   Thread 1              Thread 2              Thread 3
//!      │ try_add(k4)         │ try_get_value(k1)   │ count()
//!      ▼                     ▼                     ▼
//!   ┌──────────────────────────────────────────────────────┐
//!   │                       Mutex                          │
//!   └──────────────────────────────────────────────────────┘
//!      │ evicts k2
//!      ▼
//!   UnderLock:   observers(cache, k2) run before the mutex is released
//!   AfterUnlock: mutex released, then observers(cache, k2)
//! ```
//!
//! With the default [`NotifyMode::UnderLock`], an observer must not call back
//! into the cache that notified it: the mutex is not reentrant and the call
//! deadlocks. Use [`NotifyMode::AfterUnlock`] when observers need to read the
//! cache.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use lrukit::cache::LruCache;
//!
//! let cache: LruCache<&str, i32> = LruCache::new(2);
//! let evictions = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&evictions);
//! cache.subscribe(move |_cache, _key| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert!(cache.try_add("a", 1));
//! assert!(cache.try_add("b", 2));
//! assert!(!cache.try_add("a", 100)); // kept 1, but "a" is now freshest
//! assert!(cache.try_add("c", 3)); // evicts "b"
//!
//! assert_eq!(cache.try_get_value(&"a").as_deref(), Some(&1));
//! assert!(cache.try_get_value(&"b").is_none());
//! assert_eq!(cache.count(), 2);
//! assert_eq!(evictions.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::builder::{DEFAULT_CAPACITY, NotifyMode};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::observer::{EvictionObservers, SubscriptionId};
use crate::policy::lru::LruCore;

/// Fixed-capacity, thread-safe LRU cache with eviction observers.
///
/// Values are stored as `Arc<V>`; lookups return a clone of the `Arc`, never
/// of `V`.
pub struct LruCache<K, V> {
    core: Mutex<LruCore<K, V>>,
    observers: EvictionObservers<K, V>,
    notify_mode: NotifyMode,
    capacity: usize,
    #[cfg(feature = "metrics")]
    notifications: AtomicU64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries, with observers
    /// notified under the lock.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::cache::LruCache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_builder(capacity, NotifyMode::default())
    }

    pub(crate) fn from_builder(
        capacity: usize,
        notify_mode: NotifyMode,
    ) -> Result<Self, ConfigError> {
        let core = LruCore::try_new(capacity)?;
        debug!(capacity, %notify_mode, "lru cache created");
        Ok(Self {
            core: Mutex::new(core),
            observers: EvictionObservers::new(),
            notify_mode,
            capacity,
            #[cfg(feature = "metrics")]
            notifications: AtomicU64::new(0),
        })
    }

    /// Adds `value` under `key` if the key is not cached yet.
    ///
    /// Returns `true` if the value was stored. If the key is already cached
    /// this returns `false`, keeps the stored value, and still marks the key
    /// as most recently used. Adding a new key to a full cache evicts the
    /// least recently used entry and notifies every observer before
    /// returning.
    pub fn try_add(&self, key: K, value: V) -> bool {
        self.try_add_arc(key, Arc::new(value))
    }

    /// Same as [`try_add`](Self::try_add) for a value that is already shared.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lrukit::cache::LruCache;
    ///
    /// let cache: LruCache<u32, String> = LruCache::new(4);
    /// let shared = Arc::new("page".to_string());
    /// cache.try_add_arc(1, Arc::clone(&shared));
    /// assert!(Arc::ptr_eq(&cache.try_get_value(&1).unwrap(), &shared));
    /// ```
    pub fn try_add_arc(&self, key: K, value: Arc<V>) -> bool {
        let mut core = self.core.lock();
        let outcome = core.try_add(key, value);
        if let Some(evicted) = outcome.evicted {
            trace!(
                len = core.len(),
                capacity = self.capacity,
                observers = self.observers.len(),
                "evicted least recently used entry"
            );
            match self.notify_mode {
                NotifyMode::UnderLock => self.deliver(&evicted),
                NotifyMode::AfterUnlock => {
                    drop(core);
                    self.deliver(&evicted);
                },
            }
        }
        outcome.inserted
    }

    fn deliver(&self, evicted: &K) {
        let delivered = self.observers.notify(self, evicted);
        #[cfg(feature = "metrics")]
        self.notifications
            .fetch_add(delivered as u64, Ordering::Relaxed);
        #[cfg(not(feature = "metrics"))]
        let _ = delivered;
    }

    /// Looks up `key`, marking it as most recently used on a hit.
    ///
    /// A miss returns `None` and leaves the recency order untouched.
    pub fn try_get_value(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.core.lock();
        core.get(key).map(Arc::clone)
    }

    /// Lookup returning `(found, value)`, with `V::default()` on a miss.
    ///
    /// Clones `V` on a hit.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::cache::LruCache;
    ///
    /// let cache: LruCache<&str, i32> = LruCache::new(2);
    /// cache.try_add("a", 5);
    /// assert_eq!(cache.try_get_value_or_default(&"a"), (true, 5));
    /// assert_eq!(cache.try_get_value_or_default(&"z"), (false, 0));
    /// ```
    pub fn try_get_value_or_default(&self, key: &K) -> (bool, V)
    where
        V: Clone + Default,
    {
        match self.try_get_value(key) {
            Some(value) => (true, V::clone(&value)),
            None => (false, V::default()),
        }
    }

    /// Number of cached entries.
    pub fn count(&self) -> usize {
        self.core.lock().len()
    }

    /// Alias of [`count`](Self::count).
    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn notify_mode(&self) -> NotifyMode {
        self.notify_mode
    }

    /// Returns `true` if `key` is cached. Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.core.lock().contains(key)
    }

    /// Looks up `key` without marking it as used.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.core.lock().peek(key).map(Arc::clone)
    }

    /// The entry the next overflowing insert would evict.
    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        self.core
            .lock()
            .peek_lru()
            .map(|(key, value)| (key.clone(), Arc::clone(value)))
    }

    /// Snapshot of cached keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.core.lock().keys_by_recency()
    }

    /// Registers an eviction observer.
    ///
    /// Observers run synchronously, in registration order, once per evicted
    /// key, before the `try_add` that caused the eviction returns. Under
    /// [`NotifyMode::UnderLock`] they must not call back into this cache.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&LruCache<K, V>, &K) + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(observer))
    }

    /// Removes an observer; returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Verifies that the index and recency order agree.
    ///
    /// # Errors
    ///
    /// Returns the first divergence found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.core.lock().check_invariants()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        let mut snapshot = self.core.lock().metrics_snapshot();
        snapshot.notifications_delivered = self.notifications.load(Ordering::Relaxed);
        snapshot
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache with a capacity of [`DEFAULT_CAPACITY`].
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &self.capacity)
            .field("notify_mode", &self.notify_mode)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LruCacheBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn eviction_log<K, V>(cache: &LruCache<K, V>) -> Arc<parking_lot::Mutex<Vec<K>>>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: 'static,
    {
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        cache.subscribe(move |_cache, key: &K| sink.lock().push(key.clone()));
        log
    }

    mod construction {
        use super::*;

        #[test]
        fn empty_cache_misses() {
            let cache: LruCache<String, i32> = LruCache::default();
            assert_eq!(cache.count(), 0);
            assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
            assert!(cache.try_get_value(&"missing key".to_string()).is_none());
            assert_eq!(
                cache.try_get_value_or_default(&"missing key".to_string()),
                (false, 0)
            );
        }

        #[test]
        #[should_panic(expected = "capacity must be greater than zero")]
        fn zero_capacity_panics() {
            let _cache: LruCache<u32, u32> = LruCache::new(0);
        }

        #[test]
        fn try_new_reports_zero_capacity() {
            assert!(LruCache::<u32, u32>::try_new(0).is_err());
        }

        #[test]
        fn builder_applies_notify_mode() {
            let cache: LruCache<u8, u8> = LruCacheBuilder::new(3)
                .notify_mode(NotifyMode::AfterUnlock)
                .build();
            assert_eq!(cache.capacity(), 3);
            assert_eq!(cache.notify_mode(), NotifyMode::AfterUnlock);
        }

        #[test]
        fn max_capacity_is_accepted() {
            let cache: LruCache<u64, u64> = LruCache::new(usize::MAX);
            assert_eq!(cache.capacity(), usize::MAX);
            assert!(cache.try_add(1, 1));
            assert!(LruCache::<u64, u64>::try_new(usize::MAX / 2).is_ok());
        }

        #[test]
        fn debug_reports_shape() {
            let cache: LruCache<u8, u8> = LruCache::new(3);
            cache.try_add(1, 1);
            cache.subscribe(|_, _| {});
            let dbg = format!("{:?}", cache);
            assert!(dbg.contains("len: 1"));
            assert!(dbg.contains("capacity: 3"));
            assert!(dbg.contains("observers: 1"));
        }
    }

    mod operations {
        use super::*;

        #[test]
        fn single_entry() {
            let cache: LruCache<i32, String> = LruCache::default();
            assert!(cache.try_add(19, "nineteen".to_string()));
            assert_eq!(cache.count(), 1);
            assert_eq!(cache.try_get_value(&19).as_deref().map(String::as_str), Some("nineteen"));
            assert_eq!(cache.try_get_value_or_default(&22), (false, String::new()));
        }

        #[test]
        fn duplicate_add_keeps_value_and_count() {
            let cache: LruCache<i32, i32> = LruCache::default();
            assert!(cache.try_add(34, 34));
            assert!(!cache.try_add(34, 35));
            assert_eq!(cache.count(), 1);
            assert_eq!(cache.try_get_value_or_default(&34), (true, 34));
        }

        #[test]
        fn peek_and_contains_do_not_promote() {
            let cache: LruCache<&str, i32> = LruCache::new(2);
            cache.try_add("a", 1);
            cache.try_add("b", 2);
            assert!(cache.contains(&"a"));
            assert_eq!(cache.peek(&"a").as_deref(), Some(&1));
            assert_eq!(cache.keys_by_recency(), vec!["a", "b"]);
            assert_eq!(cache.peek_lru().map(|(k, v)| (k, *v)), Some(("a", 1)));

            cache.try_add("c", 3);
            assert!(!cache.contains(&"a"));
        }

        #[test]
        fn lookup_promotes_key() {
            let cache: LruCache<&str, i32> = LruCache::new(2);
            cache.try_add("a", 1);
            cache.try_add("b", 2);
            cache.try_get_value(&"a");
            assert_eq!(cache.keys_by_recency(), vec!["b", "a"]);
        }

        #[test]
        fn invariants_hold_after_churn() {
            let cache: LruCache<u32, u32> = LruCache::new(5);
            for i in 0..200u32 {
                cache.try_add(i % 13, i);
                cache.try_get_value(&(i % 4));
            }
            assert!(cache.check_invariants().is_ok());
            assert_eq!(cache.len(), 5);
            assert!(!cache.is_empty());
        }
    }

    mod notifications {
        use super::*;

        #[test]
        fn observer_sees_each_evicted_key() {
            let cache: LruCache<&str, i32> = LruCache::new(1);
            let log = eviction_log(&cache);

            cache.try_add("key one", 1);
            assert!(log.lock().is_empty());
            cache.try_add("key two", 2);
            assert_eq!(*log.lock(), vec!["key one"]);
            cache.try_add("key three", 3);
            assert_eq!(*log.lock(), vec!["key one", "key two"]);
        }

        #[test]
        fn no_notification_without_overflow() {
            let cache: LruCache<u32, u32> = LruCache::new(2);
            let log = eviction_log(&cache);
            cache.try_add(1, 1);
            cache.try_add(2, 2);
            cache.try_add(2, 20);
            cache.try_get_value(&1);
            cache.try_get_value(&99);
            assert!(log.lock().is_empty());
        }

        #[test]
        fn observers_fire_in_registration_order() {
            let cache: LruCache<u32, u32> = LruCache::new(1);
            let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
            for tag in ["first", "second", "third"] {
                let order = Arc::clone(&order);
                cache.subscribe(move |_, key| order.lock().push((tag, *key)));
            }
            cache.try_add(1, 1);
            cache.try_add(2, 2);
            assert_eq!(
                *order.lock(),
                vec![("first", 1), ("second", 1), ("third", 1)]
            );
        }

        #[test]
        fn unsubscribed_observer_is_silent() {
            let cache: LruCache<u32, u32> = LruCache::new(1);
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let id = cache.subscribe(move |_, _| {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
            });
            cache.try_add(1, 1);
            cache.try_add(2, 2);
            assert!(cache.unsubscribe(id));
            assert_eq!(cache.observer_count(), 0);
            cache.try_add(3, 3);
            assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
        }

        #[test]
        fn after_unlock_observer_may_read_the_cache() {
            let cache: LruCache<u32, u32> = LruCacheBuilder::new(2)
                .notify_mode(NotifyMode::AfterUnlock)
                .build();
            let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            cache.subscribe(move |cache, key| {
                sink.lock()
                    .push((*key, cache.contains(key), cache.count()));
            });

            cache.try_add(1, 10);
            cache.try_add(2, 20);
            cache.try_add(3, 30);
            assert_eq!(*seen.lock(), vec![(1, false, 2)]);
        }

        #[test]
        fn after_unlock_observer_may_insert() {
            let cache: LruCache<u32, u32> = LruCacheBuilder::new(2)
                .notify_mode(NotifyMode::AfterUnlock)
                .build();
            let depth = Arc::new(AtomicUsize::new(0));
            let guard = Arc::clone(&depth);
            cache.subscribe(move |cache, key| {
                // Re-add evicted keys below 100 under a shifted id, once.
                if *key < 100 && guard.fetch_add(1, AtomicOrdering::SeqCst) == 0 {
                    cache.try_add(key + 100, 0);
                }
            });

            cache.try_add(1, 1);
            cache.try_add(2, 2);
            cache.try_add(3, 3); // evicts 1, observer adds 101, evicting 2
            assert_eq!(cache.keys_by_recency(), vec![3, 101]);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn under_lock_observer_runs_before_try_add_returns() {
            let cache: LruCache<u32, u32> = LruCache::new(1);
            let fired = Arc::new(AtomicUsize::new(0));
            let flag = Arc::clone(&fired);
            cache.subscribe(move |_, _| {
                flag.fetch_add(1, AtomicOrdering::SeqCst);
            });
            cache.try_add(1, 1);
            cache.try_add(2, 2);
            assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_includes_notifications() {
            let cache: LruCache<u32, u32> = LruCache::new(1);
            cache.subscribe(|_, _| {});
            cache.subscribe(|_, _| {});
            cache.try_add(1, 1);
            cache.try_add(2, 2);
            cache.try_add(3, 3);
            cache.try_get_value(&3);
            cache.try_get_value(&1);

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.evicted_entries, 2);
            assert_eq!(snap.notifications_delivered, 4);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.cache_len, 1);
            assert_eq!(cache.snapshot(), snap);
        }
    }
}
