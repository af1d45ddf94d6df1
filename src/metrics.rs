use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Metrics for API operations
#[derive(Debug, Default)]
pub struct ApiMetrics {
    /// Total number of API requests, retries included
    pub request_count: AtomicU64,
    /// Total number of requests that failed for good
    pub failure_count: AtomicU64,
    /// Total number of retries
    pub retry_count: AtomicU64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, endpoint: &str) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        trace!(api_op = "request", endpoint = endpoint);
    }

    pub fn record_failure(&self, endpoint: &str, error: &str) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        trace!(api_op = "failure", endpoint = endpoint, error = error);
    }

    pub fn record_retry(&self, endpoint: &str, attempt: u32) {
        self.retry_count.fetch_add(1, Ordering::Relaxed);
        debug!(api_op = "retry", endpoint = endpoint, attempt = attempt);
    }

    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn retries(&self) -> u64 {
        self.retry_count.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn log_summary(&self) {
        debug!(
            operation = "api_metrics_summary",
            requests = self.requests(),
            retries = self.retries(),
            failures = self.failures(),
        );
    }
}

/// Metrics for a whole run
#[derive(Debug)]
pub struct Metrics {
    pub api: ApiMetrics,
    fetched_bytes: AtomicU64,
    polls: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            api: ApiMetrics::new(),
            fetched_bytes: AtomicU64::new(0),
            polls: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_fetch(&self, bytes: u64) {
        self.fetched_bytes.fetch_add(bytes, Ordering::Relaxed);
        trace!(op = "fetch", bytes = bytes);
    }

    pub fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetched_bytes(&self) -> u64 {
        self.fetched_bytes.load(Ordering::Relaxed)
    }

    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    /// Get elapsed time since metrics creation
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_full_summary(&self) {
        debug!(
            operation = "run_summary",
            fetched_bytes = self.fetched_bytes(),
            status_polls = self.polls(),
            duration_secs = self.elapsed().as_secs_f64(),
        );
        self.api.log_summary();
    }
}
