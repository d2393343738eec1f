//! Error types for lrukit.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration is invalid (a zero
//!   capacity). The panicking constructors panic with the same message.
//! - [`InvariantError`]: Returned by `check_invariants` when the lookup index
//!   and the recency order disagree.
//!
//! Missing keys and duplicate inserts are not errors; they are reported as
//! plain `bool`/`Option` outcomes.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::cache::LruCache;
//! use lrukit::error::ConfigError;
//!
//! let cache: Result<LruCache<String, i32>, ConfigError> = LruCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<String, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the cache's internal structures have diverged.
///
/// Produced by [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants)
/// and [`LruCache::check_invariants`](crate::cache::LruCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use lrukit::builder::LruCacheBuilder;
///
/// let err = LruCacheBuilder::new(0).try_build::<u64, u64>().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index holds 3 keys, recency list 2");
        assert_eq!(err.to_string(), "index holds 3 keys, recency list 2");
        assert_eq!(err.message(), "index holds 3 keys, recency list 2");
    }

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("cache capacity must be greater than zero");
        assert_eq!(err.to_string(), "cache capacity must be greater than zero");
        assert!(format!("{:?}", err).contains("capacity"));
    }

    #[test]
    fn errors_are_comparable() {
        assert_eq!(ConfigError::new("x"), ConfigError::new("x").clone());
        assert_ne!(InvariantError::new("a"), InvariantError::new("b"));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
