//! # Metrics Traits
//!
//! Recording, snapshotting and exporting are split into separate traits so
//! the cache core only ever writes counters.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │   written by LruCore under the cache lock
//!   │  get_hit/get_miss/insert    │
//!   │  evicted_entry              │
//!   └──────────────┬──────────────┘
//!                  │
//!   ┌──────────────┴──────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>  │───►│ MetricsExporter<S>           │
//!   │ (tests, benches)            │    │ (monitoring)                 │
//!   └─────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters recorded by the single-threaded core.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    /// `try_add` found the key already cached; only its recency changed.
    fn record_insert_existing(&mut self);
    fn record_evicted_entry(&mut self);
}

/// Produce a point-in-time copy of a cache's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publish a snapshot to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
