//! Simple metrics collection for observability
//!
//! This module provides lightweight metrics collection using atomic counters.
//! Designed for minimal overhead and zero allocations in the hot path.

use kvgate::KvError;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Client-facing operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Get,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Get => "get",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }

    const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Update,
        Operation::Get,
        Operation::Delete,
        Operation::List,
    ];
}

/// Core metrics collected by the server
pub struct Metrics {
    /// Server start time
    start_time: Instant,

    /// Total requests received
    pub total_requests: AtomicU64,

    /// Requests by operation, indexed by discriminant
    operation_requests: [AtomicU64; 5],

    /// Outcomes
    pub requests_ok: AtomicU64,
    pub requests_bad_request: AtomicU64,
    pub requests_conflict: AtomicU64,
    pub requests_not_found: AtomicU64,
    pub requests_too_many: AtomicU64,

    /// Request latency buckets (in microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_under_10ms: AtomicU64,
    pub latency_under_100ms: AtomicU64,
    pub latency_under_1s: AtomicU64,
    pub latency_over_1s: AtomicU64,

    /// Histogram support
    pub latency_sum_micros: AtomicU64,
    pub latency_count: AtomicU64,

    /// Store metrics
    pub stored_keys: AtomicUsize,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: AtomicU64::new(0),
            operation_requests: Default::default(),
            requests_ok: AtomicU64::new(0),
            requests_bad_request: AtomicU64::new(0),
            requests_conflict: AtomicU64::new(0),
            requests_not_found: AtomicU64::new(0),
            requests_too_many: AtomicU64::new(0),
            latency_under_1ms: AtomicU64::new(0),
            latency_under_10ms: AtomicU64::new(0),
            latency_under_100ms: AtomicU64::new(0),
            latency_under_1s: AtomicU64::new(0),
            latency_over_1s: AtomicU64::new(0),
            latency_sum_micros: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            stored_keys: AtomicUsize::new(0),
        }
    }

    /// Record a finished request, its outcome and latency
    pub fn record_request(
        &self,
        operation: Operation,
        latency_us: u64,
        outcome: Result<(), &KvError>,
    ) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.operation_counter(operation).fetch_add(1, Ordering::Relaxed);

        let outcome_counter = match outcome {
            Ok(()) => &self.requests_ok,
            Err(KvError::BadRequest(_)) => &self.requests_bad_request,
            Err(KvError::Conflict) => &self.requests_conflict,
            Err(KvError::NotFound) => &self.requests_not_found,
            Err(KvError::TooManyRequests) => &self.requests_too_many,
        };
        outcome_counter.fetch_add(1, Ordering::Relaxed);

        // Record latency bucket
        match latency_us {
            0..=999 => self.latency_under_1ms.fetch_add(1, Ordering::Relaxed),
            1000..=9999 => self.latency_under_10ms.fetch_add(1, Ordering::Relaxed),
            10000..=99999 => self.latency_under_100ms.fetch_add(1, Ordering::Relaxed),
            100000..=999999 => self.latency_under_1s.fetch_add(1, Ordering::Relaxed),
            _ => self.latency_over_1s.fetch_add(1, Ordering::Relaxed),
        };

        self.latency_sum_micros
            .fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests seen for one operation
    pub fn operation_count(&self, operation: Operation) -> u64 {
        self.operation_counter(operation).load(Ordering::Relaxed)
    }

    /// Update stored keys count
    pub fn update_stored_keys(&self, count: usize) {
        self.stored_keys.store(count, Ordering::Relaxed);
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn operation_counter(&self, operation: Operation) -> &AtomicU64 {
        &self.operation_requests[operation as usize]
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        output.push_str("# HELP kvgate_uptime_seconds Time since server start in seconds\n");
        output.push_str("# TYPE kvgate_uptime_seconds gauge\n");
        output.push_str(&format!(
            "kvgate_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        output.push_str("# HELP kvgate_requests_total Total number of requests processed\n");
        output.push_str("# TYPE kvgate_requests_total counter\n");
        output.push_str(&format!(
            "kvgate_requests_total {}\n\n",
            self.total_requests.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP kvgate_requests_by_operation Total requests by operation\n");
        output.push_str("# TYPE kvgate_requests_by_operation counter\n");
        for operation in Operation::ALL {
            output.push_str(&format!(
                "kvgate_requests_by_operation{{operation=\"{}\"}} {}\n",
                operation.as_str(),
                self.operation_count(operation)
            ));
        }
        output.push('\n');

        output.push_str("# HELP kvgate_requests_by_outcome Total requests by outcome\n");
        output.push_str("# TYPE kvgate_requests_by_outcome counter\n");
        for (outcome, counter) in [
            ("ok", &self.requests_ok),
            ("bad_request", &self.requests_bad_request),
            ("conflict", &self.requests_conflict),
            ("not_found", &self.requests_not_found),
            ("too_many_requests", &self.requests_too_many),
        ] {
            output.push_str(&format!(
                "kvgate_requests_by_outcome{{outcome=\"{outcome}\"}} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        output.push('\n');

        // Latency distribution
        let under_1ms = self.latency_under_1ms.load(Ordering::Relaxed);
        let under_10ms = under_1ms + self.latency_under_10ms.load(Ordering::Relaxed);
        let under_100ms = under_10ms + self.latency_under_100ms.load(Ordering::Relaxed);
        let under_1s = under_100ms + self.latency_under_1s.load(Ordering::Relaxed);

        output.push_str("# HELP kvgate_request_duration_seconds Request latency distribution\n");
        output.push_str("# TYPE kvgate_request_duration_seconds histogram\n");
        for (le, count) in [
            ("0.001", under_1ms),
            ("0.01", under_10ms),
            ("0.1", under_100ms),
            ("1", under_1s),
            ("+Inf", self.latency_count.load(Ordering::Relaxed)),
        ] {
            output.push_str(&format!(
                "kvgate_request_duration_seconds_bucket{{le=\"{le}\"}} {count}\n"
            ));
        }

        let latency_sum_seconds =
            self.latency_sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        output.push_str(&format!(
            "kvgate_request_duration_seconds_sum {latency_sum_seconds:.6}\n"
        ));
        output.push_str(&format!(
            "kvgate_request_duration_seconds_count {}\n\n",
            self.latency_count.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP kvgate_stored_keys Number of stored keys\n");
        output.push_str("# TYPE kvgate_stored_keys gauge\n");
        output.push_str(&format!(
            "kvgate_stored_keys {}\n",
            self.stored_keys.load(Ordering::Relaxed)
        ));

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
