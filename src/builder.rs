//! Configuration for [`LruCache`].
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::{LruCacheBuilder, NotifyMode};
//!
//! let cache = LruCacheBuilder::new(100)
//!     .notify_mode(NotifyMode::AfterUnlock)
//!     .build::<u64, String>();
//! assert!(cache.try_add(1, "hello".to_string()));
//! assert_eq!(cache.notify_mode(), NotifyMode::AfterUnlock);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::cache::LruCache;
use crate::error::ConfigError;

/// Capacity used by `LruCache::default()`.
pub const DEFAULT_CAPACITY: usize = 10;

/// When eviction observers run relative to the cache lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotifyMode {
    /// Observers run while the cache lock is held, serialized with the insert
    /// that caused the eviction. An observer that calls back into the same
    /// cache deadlocks.
    #[default]
    UnderLock,
    /// The evicted key is captured under the lock and observers run right
    /// after it is released, before `try_add` returns. Observers may call back
    /// into the cache, but notifications from concurrent inserts can
    /// interleave with other operations.
    AfterUnlock,
}

impl fmt::Display for NotifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyMode::UnderLock => f.write_str("under-lock"),
            NotifyMode::AfterUnlock => f.write_str("after-unlock"),
        }
    }
}

/// Builder for [`LruCache`].
#[derive(Debug, Clone)]
pub struct LruCacheBuilder {
    capacity: usize,
    notify_mode: NotifyMode,
}

impl LruCacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            notify_mode: NotifyMode::default(),
        }
    }

    /// Sets when eviction observers are invoked.
    pub fn notify_mode(mut self, mode: NotifyMode) -> Self {
        self.notify_mode = mode;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero. For a non-panicking alternative, use
    /// [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> LruCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds the cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is zero.
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        LruCache::from_builder(self.capacity, self.notify_mode)
    }
}

impl Default for LruCacheBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
