//! HTTP API for the exporter.
//!
//! Provides:
//! - the metrics path (default `/metrics`) - scrape syslog-ng and export
//! - `/` - landing page linking to the metrics path
//! - `/health` - exporter liveness, independent of syslog-ng

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::collector::Collector;
use crate::metrics::TEXT_CONTENT_TYPE;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub collector: Arc<Collector>,
    /// Path under which metrics are exposed.
    pub metrics_path: String,
    /// Exporter version.
    pub version: &'static str,
    /// Exporter start time.
    pub started_at: Instant,
}

/// Create the HTTP router.
pub fn create_router(state: HttpState) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route(&metrics_path, get(metrics_handler))
        .route("/", get(landing_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}

/// Handler for the metrics path.
///
/// Always answers 200 with a full exposition; an unreachable daemon shows up
/// as `syslog_ng_up 0`, not as an HTTP error.
async fn metrics_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    match state.collector.collect_and_encode().await {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
            output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn landing_handler(State(state): State<Arc<HttpState>>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Syslog-NG Exporter</title></head>\n\
         <body>\n\
         <h1>Syslog-NG Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.metrics_path
    ))
}

async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": state.version,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// Bind `addr` and serve until SIGINT or SIGTERM.
pub async fn serve(addr: SocketAddr, state: HttpState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener on {}", addr))?;
    info!(
        "Listening on {} (metrics at {})",
        listener.local_addr().unwrap_or(addr),
        state.metrics_path
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
