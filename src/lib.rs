// src/lib.rs
//! Concurrent sliding time window with pluggable aggregation, plus the thin
//! service around it (periodic reporter, HTTP surface, Prometheus metrics).

pub mod aggregator;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod reporter;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::WindowError;
pub use crate::window::{NamedAggregate, Sample, SlidingWindow, WindowReport};
