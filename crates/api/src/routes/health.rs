use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: &'static str,
    /// `connected` or `disconnected`.
    pub database: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /health -- probes database connectivity.
///
/// Responds 500 when the database cannot be reached so load balancers can
/// take the instance out of rotation.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match bookbase_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    version: env!("CARGO_PKG_VERSION"),
                }),
            )
        }
    }
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
