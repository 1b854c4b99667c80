//! # Aggregators
//! Reducers that turn the samples currently inside a window into one number.
//!
//! Every aggregator receives the valid samples in insertion order and must
//! treat them as read-only. Aggregators are shared between concurrent queries,
//! so implementations have to be pure: no interior mutability, no I/O.
//!
//! The built-ins all return `0.0` for an empty input instead of failing.

use crate::window::Sample;

pub trait Aggregator: Send + Sync {
    /// Stable name used in logs, metric labels and API responses.
    fn name(&self) -> &str;

    /// Reduce the valid samples to a single value.
    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64>;
}

/// Arithmetic mean of the sample values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Average;

impl Aggregator for Average {
    fn name(&self) -> &str {
        "average"
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        if samples.is_empty() {
            return Ok(0.0);
        }
        Ok(sum_of(samples) / samples.len() as f64)
    }
}

/// Sum of the sample values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl Aggregator for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        Ok(sum_of(samples))
    }
}

/// Number of samples in the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl Aggregator for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        Ok(samples.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl Aggregator for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        Ok(samples
            .iter()
            .map(Sample::value)
            .reduce(f64::min)
            .unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl Aggregator for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        Ok(samples
            .iter()
            .map(Sample::value)
            .reduce(f64::max)
            .unwrap_or(0.0))
    }
}

/// Named closure adapter for one-off aggregators.
///
/// ```
/// use moving_window::aggregator::{Aggregator, FnAggregator};
///
/// let last = FnAggregator::new("last", |s| Ok(s.last().map(|x| x.value()).unwrap_or(0.0)));
/// assert_eq!(last.name(), "last");
/// ```
pub struct FnAggregator<F> {
    name: String,
    f: F,
}

impl<F> FnAggregator<F>
where
    F: Fn(&[Sample]) -> anyhow::Result<f64> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Aggregator for FnAggregator<F>
where
    F: Fn(&[Sample]) -> anyhow::Result<f64> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn aggregate(&self, samples: &[Sample]) -> anyhow::Result<f64> {
        (self.f)(samples)
    }
}

/// Resolve a configured aggregator name (case-insensitive) to a built-in.
pub fn builtin(name: &str) -> Option<Box<dyn Aggregator>> {
    let agg: Box<dyn Aggregator> = match name.trim().to_ascii_lowercase().as_str() {
        "average" | "avg" | "mean" => Box::new(Average),
        "sum" => Box::new(Sum),
        "count" => Box::new(Count),
        "min" => Box::new(Min),
        "max" => Box::new(Max),
        _ => return None,
    };
    Some(agg)
}

fn sum_of(samples: &[Sample]) -> f64 {
    samples.iter().map(Sample::value).sum()
}
