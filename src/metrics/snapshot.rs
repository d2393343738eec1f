#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_existing: u64,

    pub evicted_entries: u64,
    // one per (eviction, observer) pair
    pub notifications_delivered: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LruMetricsSnapshot {
    /// Fraction of lookups that hit, or `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
