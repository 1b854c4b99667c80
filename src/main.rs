//! Sliding window service — binary entrypoint.
//! Loads settings, builds the window, starts the periodic reporter and serves
//! the HTTP API plus `/metrics`.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use moving_window::api::{self, AppState};
use moving_window::config::load_settings_default;
use moving_window::metrics::Metrics;
use moving_window::reporter::spawn_reporter;
use moving_window::SlidingWindow;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("moving_window=info,window=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = load_settings_default().context("loading window settings")?;
    let window = Arc::new(SlidingWindow::new(
        settings.window(),
        settings.build_aggregators()?,
    )?);
    tracing::info!(
        window_ms = settings.window_ms,
        report_interval_ms = settings.report_interval_ms,
        aggregators = ?window.aggregator_names(),
        "sliding window ready"
    );

    let metrics = Metrics::init()?;
    let _reporter = spawn_reporter(window.clone(), settings.report_interval());

    let app = api::router(AppState::new(window)).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "listening");

    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
