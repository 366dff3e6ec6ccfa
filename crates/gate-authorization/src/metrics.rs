//! Metrics hooks for authorization runs
//!
//! Counts check and cooldown evaluations, rejections, and policy faults.
//!
//! ## Usage
//!
//! ```ignore
//! use gate_authorization::metrics::{Metrics, MetricsRecorder};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = AuthorizationService::new(tree, &config)?.with_metrics(metrics.clone());
//!
//! // ... dispatch commands ...
//!
//! let snapshot = metrics.snapshot();
//! println!("rejected: {}", snapshot.check_runs_rejected);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for authorization runs
///
/// Thread-safe counters shared by every concurrent invocation.
#[derive(Default)]
pub struct Metrics {
    /// Total `run_checks` calls
    pub check_runs: AtomicU64,
    /// Total individual check evaluations
    pub checks_evaluated: AtomicU64,
    /// Checks reported in failure results
    pub checks_failed: AtomicU64,
    /// Checks that faulted instead of producing an outcome
    pub check_faults: AtomicU64,
    /// `run_checks` calls that rejected the command
    pub check_runs_rejected: AtomicU64,
    /// Total `run_cooldowns` calls
    pub cooldown_runs: AtomicU64,
    /// `run_cooldowns` calls that rejected the command
    pub cooldown_runs_rejected: AtomicU64,
    /// Hot buckets observed
    pub hot_buckets: AtomicU64,
    /// Cumulative `run_checks` time in nanoseconds
    pub check_run_time_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed `run_checks` call
    ///
    /// # Arguments
    /// * `duration` - Wall time of the run
    /// * `evaluated` - Number of checks evaluated, ancestors included
    pub fn record_check_run(&self, duration: Duration, evaluated: usize) {
        self.check_runs.fetch_add(1, Ordering::Relaxed);
        self.checks_evaluated.fetch_add(evaluated as u64, Ordering::Relaxed);
        self.check_run_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a rejected `run_checks` call
    pub fn record_checks_rejected(&self, failed: usize, faults: usize) {
        self.check_runs_rejected.fetch_add(1, Ordering::Relaxed);
        self.checks_failed.fetch_add(failed as u64, Ordering::Relaxed);
        self.check_faults.fetch_add(faults as u64, Ordering::Relaxed);
    }

    /// Record a completed `run_cooldowns` call
    ///
    /// # Arguments
    /// * `hot` - Number of hot buckets; zero means the command may run
    pub fn record_cooldown_run(&self, hot: usize) {
        self.cooldown_runs.fetch_add(1, Ordering::Relaxed);
        if hot > 0 {
            self.cooldown_runs_rejected.fetch_add(1, Ordering::Relaxed);
            self.hot_buckets.fetch_add(hot as u64, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            check_runs: self.check_runs.load(Ordering::Relaxed),
            checks_evaluated: self.checks_evaluated.load(Ordering::Relaxed),
            checks_failed: self.checks_failed.load(Ordering::Relaxed),
            check_faults: self.check_faults.load(Ordering::Relaxed),
            check_runs_rejected: self.check_runs_rejected.load(Ordering::Relaxed),
            cooldown_runs: self.cooldown_runs.load(Ordering::Relaxed),
            cooldown_runs_rejected: self.cooldown_runs_rejected.load(Ordering::Relaxed),
            hot_buckets: self.hot_buckets.load(Ordering::Relaxed),
            avg_check_run_ns: self.avg_check_run_ns(),
        }
    }

    /// Calculate average `run_checks` time in nanoseconds
    pub fn avg_check_run_ns(&self) -> u64 {
        let total = self.check_run_time_ns.load(Ordering::Relaxed);
        let count = self.check_runs.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Fraction of check runs that rejected the command
    pub fn rejection_rate(&self) -> f64 {
        let total = self.check_runs.load(Ordering::Relaxed);
        let rejected = self.check_runs_rejected.load(Ordering::Relaxed);
        if total > 0 {
            rejected as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.check_runs.store(0, Ordering::Relaxed);
        self.checks_evaluated.store(0, Ordering::Relaxed);
        self.checks_failed.store(0, Ordering::Relaxed);
        self.check_faults.store(0, Ordering::Relaxed);
        self.check_runs_rejected.store(0, Ordering::Relaxed);
        self.cooldown_runs.store(0, Ordering::Relaxed);
        self.cooldown_runs_rejected.store(0, Ordering::Relaxed);
        self.hot_buckets.store(0, Ordering::Relaxed);
        self.check_run_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub check_runs: u64,
    pub checks_evaluated: u64,
    pub checks_failed: u64,
    pub check_faults: u64,
    pub check_runs_rejected: u64,
    pub cooldown_runs: u64,
    pub cooldown_runs_rejected: u64,
    pub hot_buckets: u64,
    pub avg_check_run_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward counts to an external metrics system.
pub trait MetricsRecorder: Send + Sync {
    /// Record a completed `run_checks` call
    fn record_check_run(&self, duration: Duration, evaluated: usize);

    /// Record a rejected `run_checks` call
    fn record_checks_rejected(&self, failed: usize, faults: usize);

    /// Record a completed `run_cooldowns` call
    fn record_cooldown_run(&self, hot: usize);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_check_run(&self, _: Duration, _: usize) {}
    fn record_checks_rejected(&self, _: usize, _: usize) {}
    fn record_cooldown_run(&self, _: usize) {}
}

impl MetricsRecorder for Metrics {
    fn record_check_run(&self, duration: Duration, evaluated: usize) {
        Metrics::record_check_run(self, duration, evaluated);
    }

    fn record_checks_rejected(&self, failed: usize, faults: usize) {
        Metrics::record_checks_rejected(self, failed, faults);
    }

    fn record_cooldown_run(&self, hot: usize) {
        Metrics::record_cooldown_run(self, hot);
    }
}
