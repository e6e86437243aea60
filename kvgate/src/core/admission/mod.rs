//! Sliding-window admission controller
//!
//! This module provides the [`AdmissionController`], which decides whether an
//! incoming request may proceed by counting how many requests arrived in the
//! trailing window. Unlike a fixed-window counter it has no epoch boundary,
//! so a burst straddling two seconds cannot double the effective limit.
//!
//! Every checked request leaves an [`ArrivalRecord`] in the [`ArrivalLog`],
//! whether or not it is admitted. Expired records are evicted by the check
//! itself, so no background sweeper is needed.


use super::clock::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default trailing window length ("per second")
pub const DEFAULT_WINDOW_MS: i64 = 1000;

/// Admission limits
///
/// A `max_per_window` of zero or less disables admission control entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Maximum number of requests counted in one window
    pub max_per_window: i64,
    /// Trailing window length in milliseconds
    pub window_ms: i64,
}

impl AdmissionConfig {
    pub fn new(max_per_window: i64, window_ms: i64) -> Self {
        AdmissionConfig {
            max_per_window,
            window_ms,
        }
    }

    /// `max` requests per trailing second
    pub fn per_second(max: i64) -> Self {
        Self::new(max, DEFAULT_WINDOW_MS)
    }

    /// Configuration that accepts everything
    pub fn disabled() -> Self {
        Self::new(0, DEFAULT_WINDOW_MS)
    }

    pub fn is_enabled(&self) -> bool {
        self.max_per_window > 0
    }

    /// Oldest timestamp still inside the window that ends at `now_ms`
    ///
    /// The window covers `now_ms - window_ms + 1 ..= now_ms`.
    pub fn window_start(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.window_ms.max(1) - 1)
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Timestamped marker for one checked request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArrivalRecord {
    pub timestamp_ms: i64,
    pub sequence_id: u64,
}

/// Set of recent arrivals
///
/// Records are ordered by `(timestamp_ms, sequence_id)`, so eviction pops
/// from the front and only touches records that are actually removed. Equal
/// timestamps fall back to insertion order.
///
/// Each method takes the lock once; callers composing several calls see each
/// step atomically but not the sequence as a whole.
pub struct ArrivalLog {
    records: Mutex<BTreeSet<ArrivalRecord>>,
    next_sequence: AtomicU64,
}

impl ArrivalLog {
    pub fn new() -> Self {
        ArrivalLog {
            records: Mutex::new(BTreeSet::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Insert a record with a fresh sequence id
    pub fn record(&self, timestamp_ms: i64) -> ArrivalRecord {
        let record = ArrivalRecord {
            timestamp_ms,
            sequence_id: self.next_sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.records.lock().insert(record);
        record
    }

    /// Remove every record with `timestamp_ms < cutoff_ms`, returning how many were removed
    pub fn evict_before(&self, cutoff_ms: i64) -> usize {
        let mut records = self.records.lock();
        let mut evicted = 0;
        while let Some(oldest) = records.first() {
            if oldest.timestamp_ms >= cutoff_ms {
                break;
            }
            records.pop_first();
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Oldest live record, if any
    pub fn oldest(&self) -> Option<ArrivalRecord> {
        self.records.lock().first().copied()
    }
}

impl Default for ArrivalLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Records counted in the window, including this request's own
    pub in_window: usize,
    /// Time the check was evaluated at (0 when admission control is disabled)
    pub now_ms: i64,
}

/// Trailing-window admission controller
///
/// # Example
///
/// ```
/// use kvgate::{AdmissionConfig, AdmissionController, ManualClock};
///
/// let clock = ManualClock::new(10_000);
/// let controller = AdmissionController::with_clock(AdmissionConfig::per_second(2), clock.clone());
///
/// assert!(controller.check());
/// assert!(controller.check());
/// assert!(!controller.check());
///
/// // A full window later the earlier arrivals have expired
/// clock.advance(1_000);
/// assert!(controller.check());
/// ```
pub struct AdmissionController<C: Clock = SystemClock> {
    config: AdmissionConfig,
    log: ArrivalLog,
    clock: C,
}

impl AdmissionController<SystemClock> {
    /// Create a controller reading wall-clock time
    pub fn new(config: AdmissionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> AdmissionController<C> {
    pub fn with_clock(config: AdmissionConfig, clock: C) -> Self {
        AdmissionController {
            config,
            log: ArrivalLog::new(),
            clock,
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Number of arrivals currently held, expired ones included until the next check
    pub fn tracked(&self) -> usize {
        self.log.len()
    }

    /// Accept or reject one request
    pub fn check(&self) -> bool {
        self.evaluate().allowed
    }

    /// Accept or reject one request, reporting the window count
    ///
    /// The arrival is recorded before the count is taken, even when the
    /// request ends up rejected: the controller counts attempts, not
    /// admissions. Sustained overload therefore stays rejected instead of
    /// oscillating.
    pub fn evaluate(&self) -> AdmissionDecision {
        if !self.config.is_enabled() {
            return AdmissionDecision {
                allowed: true,
                in_window: 0,
                now_ms: 0,
            };
        }

        let now_ms = self.clock.now_ms();
        self.log.record(now_ms);
        self.log.evict_before(self.config.window_start(now_ms));
        let in_window = self.log.len();

        AdmissionDecision {
            allowed: in_window as i64 <= self.config.max_per_window,
            in_window,
            now_ms,
        }
    }
}
