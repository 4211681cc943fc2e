//! # Duration Profiler
//!
//! Ring buffer of recent elapsed times plus a running tally.
//!
//! ```text
//! begin_measurement() ──► MeasurementHandle ──finish()──► record(ms)
//!                              │ Weak                          │
//!                              └───────► DurationProfiler ◄────┘
//!                                        [ring: last 100 ms samples]
//!                                        [tally: all samples ever]
//! ```
//!
//! The profiler is passive: it never schedules a report by itself. The caller
//! checks [`DurationProfiler::on_tally`] after each measurement and decides.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reverb_shared::PROFILER_RING_SIZE;

/// Named aggregator of elapsed-time samples.
///
/// Safe to share between threads: the ring buffer is guarded by one mutex per
/// profiler, and the tally is additionally readable without locking.
#[derive(Debug)]
pub struct DurationProfiler {
    identifier: String,
    capacity: usize,
    /// Milliseconds, oldest first.
    samples: Mutex<VecDeque<u64>>,
    /// Total number of measurements ever recorded.
    tally: AtomicU64,
}

impl DurationProfiler {
    /// Creates a profiler keeping the default 100 most recent samples.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self::with_capacity(identifier, PROFILER_RING_SIZE)
    }

    /// Creates a profiler with a custom ring size.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn with_capacity(identifier: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            identifier: identifier.into(),
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            tally: AtomicU64::new(0),
        }
    }

    /// Starts measuring one operation.
    ///
    /// The handle does not keep the profiler alive.
    #[must_use]
    pub fn begin_measurement(self: &Arc<Self>) -> MeasurementHandle {
        MeasurementHandle {
            owner: Arc::downgrade(self),
            start: Instant::now(),
            duration: None,
        }
    }

    /// Records one sample, evicting the oldest when the ring is full.
    pub fn record(&self, duration_ms: u64) {
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(duration_ms);
        self.tally.fetch_add(1, Ordering::AcqRel);
    }

    /// Label used in reports.
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Maximum number of retained samples.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of measurements ever recorded.
    #[inline]
    #[must_use]
    pub fn tally(&self) -> u64 {
        self.tally.load(Ordering::Acquire)
    }

    /// Number of samples currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Returns true if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Copy of the retained samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<u64> {
        self.samples.lock().iter().copied().collect()
    }

    /// Sum of the retained samples in milliseconds (0 when empty).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.samples.lock().iter().sum()
    }

    /// Mean of the retained samples in milliseconds (0.0 when empty).
    #[must_use]
    pub fn average(&self) -> f64 {
        average_of(&self.samples.lock())
    }

    /// Smallest retained sample, `None` when empty.
    #[must_use]
    pub fn min(&self) -> Option<u64> {
        self.samples.lock().iter().copied().min()
    }

    /// Largest retained sample, `None` when empty.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.samples.lock().iter().copied().max()
    }

    /// Consistent view of all aggregates, taken under one lock.
    #[must_use]
    pub fn report(&self) -> ProfileReport {
        let samples = self.samples.lock();
        ProfileReport {
            identifier: self.identifier.clone(),
            tally: self.tally.load(Ordering::Acquire),
            samples: samples.len(),
            total_ms: samples.iter().sum(),
            average_ms: average_of(&samples),
            min_ms: samples.iter().copied().min(),
            max_ms: samples.iter().copied().max(),
        }
    }

    /// Runs `f` if the tally is a positive multiple of `interval`.
    ///
    /// Meant to be called right after a measurement; returns whether `f` ran.
    /// An interval of zero never fires.
    pub fn on_tally(&self, interval: u64, f: impl FnOnce(&Self)) -> bool {
        let tally = self.tally();
        if interval == 0 || tally == 0 || tally % interval != 0 {
            return false;
        }
        f(self);
        true
    }

    /// Emits the current report to the log.
    pub fn log_results(&self) {
        let report = self.report();
        tracing::info!(
            task = %report.identifier,
            tally = report.tally,
            "{report}"
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_of(samples: &VecDeque<u64>) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<u64>() as f64 / samples.len() as f64
}

/// In-flight measurement bound to one profiler.
///
/// Finishing is idempotent and harmless after the profiler is gone.
#[derive(Debug)]
pub struct MeasurementHandle {
    owner: Weak<DurationProfiler>,
    start: Instant,
    duration: Option<u64>,
}

impl MeasurementHandle {
    /// Stops the measurement and records it.
    ///
    /// Returns the recorded duration in milliseconds, or `None` if the handle
    /// was already finished or its profiler no longer exists.
    pub fn finish(&mut self) -> Option<u64> {
        if self.duration.is_some() {
            return None;
        }
        let profiler = self.owner.upgrade()?;
        let elapsed = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        profiler.record(elapsed);
        self.duration = Some(elapsed);
        Some(elapsed)
    }

    /// Recorded duration in milliseconds, once finished.
    #[inline]
    #[must_use]
    pub const fn duration(&self) -> Option<u64> {
        self.duration
    }

    /// Time since the measurement started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Aggregate statistics of one profiler at one moment.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileReport {
    /// Profiler label.
    pub identifier: String,
    /// Measurements ever recorded.
    pub tally: u64,
    /// Samples the aggregates were computed over.
    pub samples: usize,
    /// Sum of retained samples (ms).
    pub total_ms: u64,
    /// Mean of retained samples (ms).
    pub average_ms: f64,
    /// Smallest retained sample (ms).
    pub min_ms: Option<u64>,
    /// Largest retained sample (ms).
    pub max_ms: Option<u64>,
}

struct Millis(Option<u64>);

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ms) => write!(f, "{ms} ms"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Profile for task '{}', total: {} ms, average: {:.2} ms, min: {}, max: {} ({} of {} samples)",
            self.identifier,
            self.total_ms,
            self.average_ms,
            Millis(self.min_ms),
            Millis(self.max_ms),
            self.samples,
            self.tally,
        )
    }
}
