use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Ungated endpoints used by monitoring and load balancers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Plain-text "ok" as long as the process is serving requests.
        .route("/health", get(|| async { "ok" }))
        // GET /v1/ping
        // JSON liveness check carrying the server time.
        .route("/v1/ping", get(handlers::ping))
}
