//! Optional cache counters (`metrics` feature).

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::LruMetrics;
pub use snapshot::LruMetricsSnapshot;
pub use traits::{CoreMetricsRecorder, MetricsExporter, MetricsSnapshotProvider};
