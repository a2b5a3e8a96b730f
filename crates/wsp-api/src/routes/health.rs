use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// `GET /health`: 503 when the store cannot be reached
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.count_request("health");

    let (status, body) = match state.measurements().store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                database: "up",
                uptime_seconds: state.uptime_seconds(),
                version: env!("CARGO_PKG_VERSION"),
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "error",
                    database: "down",
                    uptime_seconds: state.uptime_seconds(),
                    version: env!("CARGO_PKG_VERSION"),
                },
            )
        }
    };

    (status, Json(body))
}

/// `GET /metrics`: Prometheus text exposition
pub async fn metrics(
    State(state): State<Arc<AppState>>,
) -> ([(header::HeaderName, HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}
