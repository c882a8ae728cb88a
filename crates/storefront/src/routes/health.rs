//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the QKart backend serves the catalog before returning OK.
/// Returns 503 Service Unavailable if it does not. A cached catalog counts
/// as reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().get_products().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
