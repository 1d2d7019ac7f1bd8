//! Queue observability.
//!
//! Counters are always collected. The `telemetry` feature adds an execution
//! latency histogram backed by `hdrhistogram`.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};

#[cfg(feature = "telemetry")]
pub use metrics::LatencySummary;
