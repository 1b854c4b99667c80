use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("Invalid window length {window:?}. Expected a positive whole number of milliseconds.")]
    InvalidWindowLength { window: Duration },
    #[error("At least one aggregator must be registered.")]
    NoAggregators,
    #[error("Aggregator '{name}' failed: {source}")]
    Aggregator {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
