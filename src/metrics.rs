use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_STARTED: &str = "http_requests_started_total";
pub const HTTP_COMPLETED: &str = "http_requests_completed_total";
pub const HTTP_DURATION: &str = "http_request_duration_seconds";

pub const WINDOW_AGGREGATE: &str = "window_aggregate";
pub const WINDOW_SAMPLES: &str = "window_samples";
pub const WINDOW_STORED_SAMPLES: &str = "window_stored_samples";
pub const WINDOW_REPORTS: &str = "window_reports_total";
pub const WINDOW_QUERY_ERRORS: &str = "window_query_errors_total";

const HTTP_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = builder()?
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Builder with the HTTP latency buckets applied. Tests use it to build a
/// local recorder without touching the global one.
pub fn builder() -> anyhow::Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(HTTP_DURATION.to_string()), HTTP_DURATION_BUCKETS)
        .context("prometheus: http duration buckets")
}

fn describe() {
    describe_counter!(HTTP_STARTED, "Requests received, by route");
    describe_counter!(HTTP_COMPLETED, "Requests answered, by route and status");
    describe_histogram!(HTTP_DURATION, metrics::Unit::Seconds, "Request handling time");
    describe_gauge!(WINDOW_AGGREGATE, "Latest aggregator output over the sliding window");
    describe_gauge!(WINDOW_SAMPLES, "Samples inside the window at the last report");
    describe_gauge!(WINDOW_STORED_SAMPLES, "Samples held in memory, including unpruned ones");
    describe_counter!(WINDOW_REPORTS, "Completed periodic window reports");
    describe_counter!(WINDOW_QUERY_ERRORS, "Window queries that failed in an aggregator");
}

/// Route-layer middleware: started/completed counters and a latency histogram
/// labelled with the matched route, not the raw URI.
pub async fn track_http(req: Request, next: Next) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().to_string();

    counter!(HTTP_STARTED, "path" => path.clone()).increment(1);
    let start = Instant::now();

    let resp = next.run(req).await;

    counter!(
        HTTP_COMPLETED,
        "path" => path.clone(),
        "status" => resp.status().as_u16().to_string()
    )
    .increment(1);
    histogram!(HTTP_DURATION, "path" => path, "method" => method)
        .record(start.elapsed().as_secs_f64());

    resp
}
