/// Health check endpoints for liveness and readiness probes
///
/// - Liveness: is the process up?
/// - Readiness: can the database answer a query?
use crate::{context::AppContext, db, metrics};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use std::time::Instant;
use tracing::warn;

/// Health status response
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// "healthy" or "unhealthy"
    pub status: &'static str,

    pub version: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build health and metrics routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
        .route("/metrics", get(metrics_handler))
}

/// Liveness probe
pub async fn liveness_probe() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database_ms: None,
        error: None,
    })
}

/// Readiness probe; 503 when the database cannot be reached
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> (StatusCode, Json<HealthStatus>) {
    let start = Instant::now();

    match db::test_connection(&ctx.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
                database_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            }),
        ),
        Err(e) => {
            warn!(operation = "readiness_probe", error = %e, "Database not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unhealthy",
                    version: env!("CARGO_PKG_VERSION"),
                    database_ms: None,
                    error: Some("Database unavailable".to_string()),
                }),
            )
        }
    }
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> (StatusCode, [(&'static str, &'static str); 1], String) {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
