pub use crate::builder::{DEFAULT_CAPACITY, LruCacheBuilder, NotifyMode};
pub use crate::cache::LruCache;
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
pub use crate::observer::{EvictionObserver, SubscriptionId};
pub use crate::policy::lru::{AddOutcome, LruCore};
