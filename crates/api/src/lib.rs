//! HTTP API server for the ticket sales backend.
//!
//! Exposes the purchase, order-read, stock, cancel, and reset endpoints
//! over JSON, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::tickets::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/pesan-tiket", post(routes::tickets::purchase))
        .route("/api/pesanan", get(routes::tickets::list))
        .route("/api/stok", get(routes::tickets::stock))
        .route("/api/tiket/{id}", get(routes::tickets::get))
        .route("/api/tiket/{id}/cancel", post(routes::tickets::cancel))
        .route("/api/reset", post(routes::tickets::reset))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
