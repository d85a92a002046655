//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 once the data source can produce trend points.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_source(&state).await {
        Some(_) => StatusCode::OK,
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let points = check_source(&state).await;

    let (status, source_status) = match points {
        Some(_) => ("healthy", "ok"),
        None => ("degraded", "error"),
    };

    Json(HealthResponse {
        status: status.to_string(),
        source: state.source.describe(),
        source_status: source_status.to_string(),
        points,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Number of points the source currently yields, `None` when it fails
async fn check_source(state: &AppState) -> Option<usize> {
    match state.source.trends().await {
        Ok(trends) => Some(trends.len()),
        Err(e) => {
            tracing::warn!(source = %state.source.describe(), error = %e, "Trend source unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
