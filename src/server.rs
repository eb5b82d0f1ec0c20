/// HTTP server setup and routing
use crate::{
    api::middleware::VIEWER_HEADER,
    context::AppContext,
    error::{FeedError, FeedResult},
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::Json,
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = cors_layer(ctx.config.service.cors_origin.as_deref());

    Router::new()
        .merge(crate::api::routes())
        .fallback(not_found)
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(VIEWER_HEADER)]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) => {
            warn!("FEED_CORS_ORIGIN is not a valid header value, allowing any origin");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn serve(ctx: AppContext) -> FeedResult<()> {
    let addr = ctx.config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FeedError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Reels feed listening on {}", addr);

    let app = build_router(ctx.clone());
    let token = ctx.shutdown.clone();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, cancelling in-flight queries");
            token.cancel();
        })
        .await
        .map_err(|e| FeedError::Internal(format!("Server error: {}", e)))?;

    ctx.close().await;
    info!("Server stopped");

    Ok(())
}
