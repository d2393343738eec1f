//! # LRU Core
//!
//! Single-threaded core of [`LruCache`](crate::cache::LruCache): a hash index
//! and a recency list kept in lockstep through one write path.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                            LruCore<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, Entry<V>>                                      │   │
//!   │   │                                                              │   │
//!   │   │  ┌─────────┬──────────────────────────────────────────┐      │   │
//!   │   │  │   Key   │  Entry { value: Arc<V>, node: SlotId }   │      │   │
//!   │   │  ├─────────┼──────────────────────────────────────────┤      │   │
//!   │   │  │  "a"    │  ──────────────────────────────────┐     │      │   │
//!   │   │  │  "b"    │  ────────────────────────────┐     │     │      │   │
//!   │   │  │  "c"    │  ──────────────────────┐     │     │     │      │   │
//!   │   │  └─────────┴────────────────────────┼─────┼─────┼─────┘      │   │
//!   │   └─────────────────────────────────────┼─────┼─────┼────────────┘   │
//!   │                                         ▼     ▼     ▼                │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<K> (recency order)                            │   │
//!   │   │                                                              │   │
//!   │   │  head ──► ┌─────┐ ◄──► ┌─────┐ ◄──► ┌─────┐ ◄── tail         │   │
//!   │   │   (LRU)   │ "c" │      │ "b" │      │ "a" │   (MRU)          │   │
//!   │   │           └─────┘      └─────┘      └─────┘                  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariant after every public call: `map.len() == order.len() <= capacity`,
//! and every index entry's `SlotId` points at a list node holding its key.
//!
//! ## try_add Flow
//!
//! ```text
//!   try_add(k, v)
//!     ├─ k cached?   move_to_back(entry.node)          → inserted = false
//!     │              (value untouched, no eviction)
//!     └─ k new?      node = push_back(k)
//!                    order.len() > capacity → pop_front, remove from map
//!                    map.insert(k, Entry { v, node })  → inserted = true
//! ```
//!
//! A repeated `try_add` is deliberately *not* an upsert: the first value
//! stays, but the key still becomes most recently used.
//!
//! ## Operations
//!
//! | Method              | Complexity | Touches recency |
//! |---------------------|------------|-----------------|
//! | `try_add(k, v)`     | O(1)*      | yes             |
//! | `get(&k)`           | O(1)       | on hit          |
//! | `peek(&k)`          | O(1)       | no              |
//! | `contains(&k)`      | O(1)       | no              |
//! | `peek_lru()`        | O(1)       | no              |
//! | `keys_by_recency()` | O(n)       | no              |
//! | `check_invariants()`| O(n)       | no              |
//!
//! ## Thread Safety
//!
//! `LruCore` is not synchronized. [`LruCache`](crate::cache::LruCache) wraps it
//! in a `parking_lot::Mutex`.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};

/// Index entry: the value plus the handle of the key's recency node.
#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    node: SlotId,
}

/// Result of [`LruCore::try_add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome<K> {
    /// `true` if the key was absent and the value was stored.
    pub inserted: bool,
    /// Key evicted to make room, if the insert overflowed capacity.
    pub evicted: Option<K>,
}

/// Upper bound on slots reserved up front; larger caches grow on demand.
const MAX_PREALLOC: usize = 1 << 16;

/// Fixed-capacity LRU index + recency order.
pub struct LruCore<K, V> {
    map: FxHashMap<K, Entry<V>>,
    order: IntrusiveList<K>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) for
    /// capacities coming from configuration.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(core) => core,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a core, returning an error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        let reserve = capacity.min(MAX_PREALLOC);
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            // One spare node: a new key is linked before the overflow is evicted.
            order: IntrusiveList::with_capacity(reserve + 1),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Inserts `value` under `key` if the key is absent, evicting the least
    /// recently used entry on overflow. A present key is promoted to most
    /// recently used and keeps its stored value.
    pub fn try_add(&mut self, key: K, value: Arc<V>) -> AddOutcome<K> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(entry) = self.map.get(&key) {
            self.order.move_to_back(entry.node);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_existing();
            self.debug_validate_invariants();
            return AddOutcome {
                inserted: false,
                evicted: None,
            };
        }

        let node = self.order.push_back(key.clone());
        let evicted = if self.order.len() > self.capacity {
            self.evict_lru()
        } else {
            None
        };
        self.map.insert(key, Entry { value, node });

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();
        self.debug_validate_invariants();
        AddOutcome {
            inserted: true,
            evicted,
        }
    }

    /// Removes the head of the recency order from both structures.
    fn evict_lru(&mut self) -> Option<K> {
        let key = self.order.pop_front()?;
        self.map.remove(&key);
        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        Some(key)
    }

    /// Returns the value for `key` and promotes it to most recently used.
    ///
    /// A miss leaves the recency order untouched.
    pub fn get(&mut self, key: &K) -> Option<&Arc<V>> {
        match self.map.get(key) {
            Some(entry) => {
                self.order.move_to_back(entry.node);
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                Some(&entry.value)
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                None
            },
        }
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&Arc<V>> {
        self.map.get(key).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// The entry that the next overflowing insert would evict.
    pub fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        let key = self.order.front()?;
        self.map.get(key).map(|entry| (key, &entry.value))
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }

    /// Verifies that the index and the recency order describe the same key set.
    ///
    /// # Errors
    ///
    /// Returns the first divergence found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys, recency list {}",
                self.map.len(),
                self.order.len()
            )));
        }
        if self.map.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.map.len(),
                self.capacity
            )));
        }
        self.order.check_links()?;
        for (id, key) in self.order.iter_entries() {
            match self.map.get(key) {
                Some(entry) if entry.node == id => {},
                Some(entry) => {
                    return Err(InvariantError::new(format!(
                        "index handle {:?} does not match list node {:?}",
                        entry.node, id
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "list node {:?} holds a key missing from the index",
                        id
                    )));
                },
            }
        }
        Ok(())
    }

    #[inline]
    fn debug_validate_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.check_invariants() {
            panic!("LruCore invariant violated: {}", e);
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            cache_len: self.len(),
            capacity: self.capacity,
            ..self.metrics.to_snapshot()
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> LruCore<K, V> {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
