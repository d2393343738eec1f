//! lrukit: a fixed-capacity, thread-safe LRU cache with eviction observers.
//!
//! The crate is layered bottom-up:
//!
//! - [`ds`]: slot arena and intrusive doubly linked list used for recency order.
//! - [`policy::lru::LruCore`]: single-threaded LRU index and eviction.
//! - [`cache::LruCache`]: mutex-guarded wrapper with multicast eviction
//!   notification through [`observer`].
//! - [`builder`]: capacity and [`builder::NotifyMode`] configuration.
//!
//! ```
//! use lrukit::prelude::*;
//!
//! let cache: LruCache<u32, &str> = LruCache::new(2);
//! cache.try_add(1, "one");
//! cache.try_add(2, "two");
//! cache.try_add(3, "three");
//! assert!(cache.try_get_value(&1).is_none());
//! assert_eq!(cache.count(), 2);
//! ```

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod observer;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

pub use crate::builder::{DEFAULT_CAPACITY, LruCacheBuilder, NotifyMode};
pub use crate::cache::LruCache;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
pub use crate::observer::{EvictionObserver, SubscriptionId};
