use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::metrics::traits::CoreMetricsRecorder;

/// Counters owned by [`LruCore`](crate::policy::lru::LruCore).
///
/// Plain integers: every write happens under the cache mutex.
#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_existing: u64,
    pub evicted_entries: u64,
}

impl LruMetrics {
    /// Copies the counters into a snapshot. Gauges and notification counts are
    /// filled in by the caller.
    pub fn to_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_existing: self.insert_existing,
            evicted_entries: self.evicted_entries,
            ..LruMetricsSnapshot::default()
        }
    }
}

impl CoreMetricsRecorder for LruMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_existing(&mut self) {
        self.insert_existing += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_counters_split_hits_and_misses() {
        let mut metrics = LruMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_hit();
        metrics.record_get_miss();
        assert_eq!(metrics.get_calls, 3);
        assert_eq!(metrics.get_hits, 2);
        assert_eq!(metrics.get_misses, 1);
    }

    #[test]
    fn snapshot_copies_counters_and_leaves_gauges_zeroed() {
        let mut metrics = LruMetrics::default();
        metrics.record_insert_call();
        metrics.record_insert_new();
        metrics.record_insert_call();
        metrics.record_insert_existing();
        metrics.record_evicted_entry();

        let snap = metrics.to_snapshot();
        assert_eq!(snap.insert_calls, 2);
        assert_eq!(snap.insert_new, 1);
        assert_eq!(snap.insert_existing, 1);
        assert_eq!(snap.evicted_entries, 1);
        assert_eq!(snap.cache_len, 0);
        assert_eq!(snap.notifications_delivered, 0);
    }
}
