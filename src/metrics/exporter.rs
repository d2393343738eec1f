use std::io::Write;

use parking_lot::Mutex;

use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for LRU cache snapshots.
///
/// Writes the text exposition format, one `# TYPE` line per series, so the
/// output can be scraped directly or forwarded to a collector. Write errors
/// are ignored; metrics never fail a cache operation.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_series(&self, kind: &str, name: &str, value: u64) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<LruMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &LruMetricsSnapshot) {
        let counters = [
            ("get_calls_total", snapshot.get_calls),
            ("get_hits_total", snapshot.get_hits),
            ("get_misses_total", snapshot.get_misses),
            ("insert_calls_total", snapshot.insert_calls),
            ("insert_new_total", snapshot.insert_new),
            ("insert_existing_total", snapshot.insert_existing),
            ("evicted_entries_total", snapshot.evicted_entries),
            (
                "eviction_notifications_total",
                snapshot.notifications_delivered,
            ),
        ];
        for (suffix, value) in counters {
            self.write_series("counter", &self.metric_name(suffix), value);
        }
        self.write_series("gauge", &self.metric_name("len"), snapshot.cache_len as u64);
        self.write_series(
            "gauge",
            &self.metric_name("capacity"),
            snapshot.capacity as u64,
        );
    }
}
