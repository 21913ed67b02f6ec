// Performance metrics module
//
// Lightweight counters for a generation run

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Run metrics
///
/// Atomic counters, shared across worker threads without locks, logged once
/// when the run ends.
#[derive(Debug)]
pub struct Metrics {
    /// Modules whose artifact was generated (written or already up to date)
    pub modules_generated: AtomicUsize,

    pub modules_failed: AtomicUsize,

    pub modules_skipped: AtomicUsize,

    /// Artifacts whose bytes actually changed on disk
    pub artifacts_written: AtomicUsize,

    pub identifiers_emitted: AtomicUsize,

    pub warnings_recorded: AtomicUsize,

    /// Time spent generating modules, summed across workers
    pub total_generation_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            modules_generated: AtomicUsize::new(0),
            modules_failed: AtomicUsize::new(0),
            modules_skipped: AtomicUsize::new(0),
            artifacts_written: AtomicUsize::new(0),
            identifiers_emitted: AtomicUsize::new(0),
            warnings_recorded: AtomicUsize::new(0),
            total_generation_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a generated module and the identifiers it emitted
    pub fn record_module_generated(&self, identifiers: usize, written: bool) {
        self.modules_generated.fetch_add(1, Ordering::Relaxed);
        self.identifiers_emitted
            .fetch_add(identifiers, Ordering::Relaxed);
        if written {
            self.artifacts_written.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_module_failed(&self) {
        self.modules_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_module_skipped(&self) {
        self.modules_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_warnings(&self, count: usize) {
        self.warnings_recorded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_generation_time(&self, duration: Duration) {
        self.total_generation_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average generation time per processed (generated or failed) module
    pub fn avg_generation_time_ms(&self) -> f64 {
        let total = self.total_generation_time_ms.load(Ordering::Relaxed);
        let count = self.modules_generated.load(Ordering::Relaxed)
            + self.modules_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Generation Metrics Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Modules: {} generated, {} failed, {} skipped",
            self.modules_generated.load(Ordering::Relaxed),
            self.modules_failed.load(Ordering::Relaxed),
            self.modules_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Identifiers: {}, artifacts rewritten: {}, warnings: {}",
            self.identifiers_emitted.load(Ordering::Relaxed),
            self.artifacts_written.load(Ordering::Relaxed),
            self.warnings_recorded.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Generation time: {:.2}s (avg: {:.2}ms per module)",
            self.total_generation_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_generation_time_ms()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.modules_generated.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.modules_failed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_module_operations() {
        let metrics = Metrics::new();

        metrics.record_module_generated(5, true);
        metrics.record_module_generated(2, false);
        metrics.record_module_failed();
        metrics.record_module_skipped();
        metrics.record_warnings(3);

        assert_eq!(metrics.modules_generated.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.artifacts_written.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.identifiers_emitted.load(Ordering::Relaxed), 7);
        assert_eq!(metrics.modules_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.modules_skipped.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.warnings_recorded.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_avg_generation_time() {
        let metrics = Metrics::new();

        metrics.record_module_generated(1, true);
        metrics.record_generation_time(Duration::from_millis(100));
        metrics.record_module_failed();
        metrics.record_generation_time(Duration::from_millis(200));

        assert_eq!(metrics.total_generation_time_ms.load(Ordering::Relaxed), 300);
        assert_eq!(metrics.avg_generation_time_ms(), 150.0);
    }

    #[test]
    fn test_avg_generation_time_no_modules() {
        assert_eq!(Metrics::new().avg_generation_time_ms(), 0.0);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
