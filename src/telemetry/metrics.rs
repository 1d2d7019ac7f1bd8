//! Metrics collection for queue monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "telemetry")]
use hdrhistogram::Histogram;
#[cfg(feature = "telemetry")]
use parking_lot::RwLock;

/// Queue metrics collector
#[derive(Debug)]
pub struct Metrics {
    tasks_enqueued: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_purged: AtomicU64,
    tasks_rejected: AtomicU64,
    tasks_panicked: AtomicU64,
    placeholders_skipped: AtomicU64,
    enqueue_failures: AtomicU64,

    busy_time_ns: AtomicU64,

    // Execution latency, nanoseconds
    #[cfg(feature = "telemetry")]
    latency_histogram: RwLock<Histogram<u64>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            tasks_enqueued: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_purged: AtomicU64::new(0),
            tasks_rejected: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            placeholders_skipped: AtomicU64::new(0),
            enqueue_failures: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
            // 3 significant figures, max value of 1 hour in nanoseconds
            #[cfg(feature = "telemetry")]
            latency_histogram: RwLock::new(
                Histogram::new_with_max(3_600_000_000_000, 3)
                    .expect("Failed to create histogram"),
            ),
            start_time: Instant::now(),
        }
    }

    pub fn record_enqueued(&self) {
        self.tasks_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_execution(&self, duration_ns: u64) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        self.busy_time_ns.fetch_add(duration_ns, Ordering::Relaxed);

        #[cfg(feature = "telemetry")]
        if let Some(mut hist) = self.latency_histogram.try_write() {
            let _ = hist.record(duration_ns.max(1));
        }
    }

    pub fn record_purged(&self, count: u64) {
        self.tasks_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.tasks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_placeholder(&self) {
        self.placeholders_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueue_failure(&self) {
        self.enqueue_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        #[cfg(feature = "telemetry")]
        let latency = {
            let histogram = self.latency_histogram.read();
            if histogram.len() > 0 {
                LatencySummary {
                    avg_ns: histogram.mean() as u64,
                    p50_ns: histogram.value_at_quantile(0.50),
                    p99_ns: histogram.value_at_quantile(0.99),
                    max_ns: histogram.max(),
                }
            } else {
                LatencySummary::default()
            }
        };

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_enqueued: self.tasks_enqueued.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_purged: self.tasks_purged.load(Ordering::Relaxed),
            tasks_rejected: self.tasks_rejected.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            placeholders_skipped: self.placeholders_skipped.load(Ordering::Relaxed),
            enqueue_failures: self.enqueue_failures.load(Ordering::Relaxed),
            busy_time_ns: self.busy_time_ns.load(Ordering::Relaxed),
            #[cfg(feature = "telemetry")]
            latency,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "telemetry")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencySummary {
    pub avg_ns: u64,
    pub p50_ns: u64,
    pub p99_ns: u64,
    pub max_ns: u64,
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_enqueued: u64,
    pub tasks_executed: u64,
    pub tasks_purged: u64,
    pub tasks_rejected: u64,
    pub tasks_panicked: u64,
    pub placeholders_skipped: u64,
    pub enqueue_failures: u64,
    pub busy_time_ns: u64,
    #[cfg(feature = "telemetry")]
    pub latency: LatencySummary,
}

impl MetricsSnapshot {
    /// Accepted work items that have not reached a terminal disposition yet.
    pub fn outstanding(&self) -> u64 {
        self.tasks_enqueued
            .saturating_sub(self.tasks_executed)
            .saturating_sub(self.tasks_panicked)
            .saturating_sub(self.tasks_purged)
    }

    /// Fraction of uptime the worker spent running tasks (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        let uptime_ns = self.uptime.as_nanos() as f64;
        if uptime_ns == 0.0 {
            return 0.0;
        }
        (self.busy_time_ns as f64 / uptime_ns).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_basic() {
        let metrics = Metrics::new();

        metrics.record_enqueued();
        metrics.record_enqueued();
        metrics.record_enqueued();
        metrics.record_task_execution(1000);
        metrics.record_purged(1);
        metrics.record_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_enqueued, 3);
        assert_eq!(snapshot.tasks_executed, 1);
        assert_eq!(snapshot.tasks_purged, 1);
        assert_eq!(snapshot.tasks_rejected, 1);
        assert_eq!(snapshot.outstanding(), 1);
        assert_eq!(snapshot.busy_time_ns, 1000);
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn test_latency_histogram() {
        let metrics = Metrics::new();

        metrics.record_task_execution(1_000);
        metrics.record_task_execution(3_000);

        let latency = metrics.snapshot().latency;
        assert!(latency.avg_ns > 0);
        assert!(latency.max_ns >= 3_000);
    }

    #[test]
    fn test_utilization_bounds() {
        let snapshot = MetricsSnapshot {
            uptime: Duration::from_secs(1),
            tasks_enqueued: 0,
            tasks_executed: 0,
            tasks_purged: 0,
            tasks_rejected: 0,
            tasks_panicked: 0,
            placeholders_skipped: 0,
            enqueue_failures: 0,
            busy_time_ns: 500_000_000,
            #[cfg(feature = "telemetry")]
            latency: LatencySummary::default(),
        };

        assert_eq!(snapshot.utilization(), 0.5);
    }
}
