// src/reporter.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::WindowError;
use crate::metrics::{
    WINDOW_AGGREGATE, WINDOW_QUERY_ERRORS, WINDOW_REPORTS, WINDOW_SAMPLES, WINDOW_STORED_SAMPLES,
};
use crate::window::{SlidingWindow, WindowReport};

/// Query the window once, publish gauges and log the outcome.
pub fn report_once<C: Clock>(window: &SlidingWindow<C>) -> Result<WindowReport, WindowError> {
    gauge!(WINDOW_STORED_SAMPLES).set(window.stored_len() as f64);

    let report = match window.report() {
        Ok(r) => r,
        Err(e) => {
            counter!(WINDOW_QUERY_ERRORS).increment(1);
            tracing::warn!(target: "window", error = %e, "window report failed");
            return Err(e);
        }
    };

    gauge!(WINDOW_SAMPLES).set(report.count as f64);
    for agg in &report.aggregates {
        gauge!(WINDOW_AGGREGATE, "aggregator" => agg.name.clone()).set(agg.value);
    }
    counter!(WINDOW_REPORTS).increment(1);

    tracing::info!(
        target: "window",
        count = report.count,
        aggregates = ?report.aggregates,
        "window report"
    );
    Ok(report)
}

/// Spawn a background task that reports on a fixed cadence. Failed reports
/// are logged and counted; the loop keeps going.
pub fn spawn_reporter<C>(window: Arc<SlidingWindow<C>>, interval: Duration) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            tracing::debug!(target: "window", tick, "report tick");
            let _ = report_once(&window);
            tick += 1;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{Average, FnAggregator, Sum};
    use crate::clock::ManualClock;

    #[test]
    fn report_once_returns_named_aggregates() {
        let clock = ManualClock::new(0);
        let w = SlidingWindow::with_clock(
            Duration::from_secs(3),
            vec![Box::new(Average), Box::new(Sum)],
            clock.clone(),
        )
        .unwrap();
        w.add_value(4.0);
        w.add_value(2.0);

        let r = report_once(&w).unwrap();
        assert_eq!(r.count, 2);
        assert_eq!(r.aggregates[0].name, "average");
        assert_eq!(r.aggregates[0].value, 3.0);
        assert_eq!(r.aggregates[1].value, 6.0);
    }

    #[test]
    fn report_once_surfaces_aggregator_failure() {
        let w = SlidingWindow::with_clock(
            Duration::from_secs(1),
            vec![Box::new(FnAggregator::new("broken", |_| {
                Err(anyhow::anyhow!("boom"))
            }))],
            ManualClock::new(0),
        )
        .unwrap();
        assert!(matches!(
            report_once(&w),
            Err(WindowError::Aggregator { ref name, .. }) if name == "broken"
        ));
    }
}
