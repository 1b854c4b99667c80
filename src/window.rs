//! # Sliding Window
//! Fixed-length time window over `f64` samples with pluggable aggregation.
//!
//! Producers call [`SlidingWindow::add_value`], which prunes the expired
//! prefix of the buffer and appends a sample stamped with the clock's "now".
//! Consumers call [`SlidingWindow::query`] (or [`SlidingWindow::report`]),
//! which copies the samples still inside the window under a shared lock and
//! runs every registered aggregator over that copy.
//!
//! Queries never prune. They filter against their own "now", so a query never
//! sees a sample older than the window even if no write has happened for a
//! while.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;

use crate::aggregator::Aggregator;
use crate::clock::{Clock, SystemClock};
use crate::error::WindowError;

/// One timestamped observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    value: f64,
    timestamp_ms: i64,
}

impl Sample {
    /// Samples stored by a window are always stamped with the clock's "now".
    pub fn new(value: f64, timestamp_ms: i64) -> Self {
        Self {
            value,
            timestamp_ms,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

/// Aggregator output paired with the aggregator's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedAggregate {
    pub name: String,
    pub value: f64,
}

/// Everything a consumer usually wants from one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
    pub window_ms: i64,
    pub count: usize,
    pub aggregates: Vec<NamedAggregate>,
}

/// Timestamp-ordered sample buffer. Callers provide "now"; locking lives in
/// [`SlidingWindow`].
#[derive(Debug, Default)]
struct Buffer {
    samples: VecDeque<Sample>,
}

impl Buffer {
    /// Pop expired samples off the front. Returns how many were removed.
    fn prune(&mut self, cutoff_ms: i64) -> usize {
        let mut removed = 0;
        while let Some(front) = self.samples.front() {
            if front.timestamp_ms >= cutoff_ms {
                break;
            }
            self.samples.pop_front();
            removed += 1;
        }
        removed
    }

    fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
    }

    /// Copy of the samples at or after `cutoff_ms`, buffer untouched.
    fn valid(&self, cutoff_ms: i64) -> Vec<Sample> {
        let first = self
            .samples
            .partition_point(|s| s.timestamp_ms < cutoff_ms);
        self.samples.range(first..).copied().collect()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Thread-safe sliding time window.
pub struct SlidingWindow<C = SystemClock> {
    window_ms: i64,
    buffer: RwLock<Buffer>,
    aggregators: Vec<Arc<dyn Aggregator>>,
    clock: C,
}

impl SlidingWindow<SystemClock> {
    /// Window driven by the system wall clock.
    pub fn new(
        window: Duration,
        aggregators: Vec<Box<dyn Aggregator>>,
    ) -> Result<Self, WindowError> {
        Self::with_clock(window, aggregators, SystemClock)
    }
}

impl<C: Clock> SlidingWindow<C> {
    /// Window driven by `clock`, which must never go backwards.
    ///
    /// Fails with [`WindowError::InvalidWindowLength`] unless `window` is a
    /// positive whole number of milliseconds that fits in `i64`, and with
    /// [`WindowError::NoAggregators`] when `aggregators` is empty.
    pub fn with_clock(
        window: Duration,
        aggregators: Vec<Box<dyn Aggregator>>,
        clock: C,
    ) -> Result<Self, WindowError> {
        let window_ms = Some(window)
            .filter(|w| w.subsec_nanos() % 1_000_000 == 0)
            .and_then(|w| i64::try_from(w.as_millis()).ok())
            .filter(|ms| *ms > 0)
            .ok_or(WindowError::InvalidWindowLength { window })?;
        if aggregators.is_empty() {
            return Err(WindowError::NoAggregators);
        }

        Ok(Self {
            window_ms,
            buffer: RwLock::new(Buffer::default()),
            aggregators: aggregators.into_iter().map(Arc::from).collect(),
            clock,
        })
    }

    /// Record `value` at the current time, dropping expired samples first.
    pub fn add_value(&self, value: f64) {
        let mut buf = self.buffer.write();
        // Read the clock under the write lock so stored timestamps stay ordered.
        let now = self.clock.now_ms();
        let removed = buf.prune(self.cutoff(now));
        if removed > 0 {
            tracing::trace!(removed, remaining = buf.len(), "pruned expired samples");
        }
        buf.push(Sample::new(value, now));
    }

    /// Run every aggregator over the valid samples. Results follow
    /// registration order. The first failing aggregator fails the whole call.
    pub fn query(&self) -> Result<Vec<f64>, WindowError> {
        let samples = self.valid_samples();
        self.aggregators
            .iter()
            .map(|agg| run(agg.as_ref(), &samples))
            .collect()
    }

    /// Like [`query`](Self::query) but with names and the sample count.
    pub fn report(&self) -> Result<WindowReport, WindowError> {
        let samples = self.valid_samples();
        let aggregates = self
            .aggregators
            .iter()
            .map(|agg| {
                run(agg.as_ref(), &samples).map(|value| NamedAggregate {
                    name: agg.name().to_string(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WindowReport {
            window_ms: self.window_ms,
            count: samples.len(),
            aggregates,
        })
    }

    /// Samples inside the window at the time of the call, oldest first.
    pub fn valid_samples(&self) -> Vec<Sample> {
        let now = self.clock.now_ms();
        self.buffer.read().valid(self.cutoff(now))
    }

    /// Samples physically held, including expired ones not yet pruned.
    pub fn stored_len(&self) -> usize {
        self.buffer.read().len()
    }

    /// Configured window length.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms as u64)
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Aggregator names in registration order.
    pub fn aggregator_names(&self) -> Vec<&str> {
        self.aggregators.iter().map(|a| a.name()).collect()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn cutoff(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.window_ms)
    }
}

impl<C> fmt::Debug for SlidingWindow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("window_ms", &self.window_ms)
            .field("stored", &self.buffer.read().len())
            .field(
                "aggregators",
                &self.aggregators.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn run(agg: &dyn Aggregator, samples: &[Sample]) -> Result<f64, WindowError> {
    agg.aggregate(samples)
        .map_err(|source| WindowError::Aggregator {
            name: agg.name().to_string(),
            source: source.into(),
        })
}
