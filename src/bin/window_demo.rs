//! Demo that feeds a 3s window on a fixed timeline while a reporter logs
//! Average/Sum every second.

use std::sync::Arc;
use std::time::Duration;

use moving_window::aggregator::{Average, Sum};
use moving_window::reporter::spawn_reporter;
use moving_window::SlidingWindow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let window = Arc::new(SlidingWindow::new(
        Duration::from_secs(3),
        vec![Box::new(Average), Box::new(Sum)],
    )?);
    let reporter = spawn_reporter(window.clone(), Duration::from_secs(1));

    window.add_value(3.0);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    window.add_value(2.0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    window.add_value(1.0);
    tokio::time::sleep(Duration::from_secs(5)).await;

    reporter.abort();
    println!("window-demo done");
    Ok(())
}
