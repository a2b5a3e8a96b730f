//! HTTP surface of the weather station platform
//!
//! Routes:
//! - `POST /auth`
//! - `GET /measurements`
//! - `POST /measurements/{air-measurement,ground-temperature,wind-measurement,rainfall}`
//! - `GET /health`, `GET /metrics`

pub mod auth;
pub mod context;
pub mod error;
pub mod routes;
pub mod state;

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use auth::{AuthSettings, Claims, TokenIssuer};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", post(routes::auth::login))
        .route("/measurements", get(routes::measurements::get_measurements))
        .route(
            "/measurements/air-measurement",
            post(routes::measurements::add_air_measurement),
        )
        .route(
            "/measurements/ground-temperature",
            post(routes::measurements::add_ground_temperature),
        )
        .route(
            "/measurements/wind-measurement",
            post(routes::measurements::add_wind_measurement),
        )
        .route(
            "/measurements/rainfall",
            post(routes::measurements::add_rainfall),
        )
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(context::request_context))
        .with_state(state)
}

/// Serve until `shutdown` resolves, letting in-flight requests finish
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "server ready");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
