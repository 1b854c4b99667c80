use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::metrics::{track_http, WINDOW_QUERY_ERRORS};
use crate::window::{SlidingWindow, WindowReport};

#[derive(Clone)]
pub struct AppState {
    pub window: Arc<SlidingWindow>,
}

impl AppState {
    pub fn new(window: Arc<SlidingWindow>) -> Self {
        Self { window }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/samples", post(add_sample))
        .route("/window", get(window_report))
        .route_layer(middleware::from_fn(track_http))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct SampleReq {
    value: f64,
}

async fn add_sample(State(state): State<AppState>, Json(body): Json<SampleReq>) -> StatusCode {
    state.window.add_value(body.value);
    StatusCode::ACCEPTED
}

#[derive(Serialize)]
struct ErrorResp {
    error: String,
}

async fn window_report(State(state): State<AppState>) -> Response {
    match state.window.report() {
        Ok(report) => Json::<WindowReport>(report).into_response(),
        Err(e) => {
            counter!(WINDOW_QUERY_ERRORS).increment(1);
            tracing::warn!(target: "window", error = %e, "window query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResp {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
