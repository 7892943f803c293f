//! HTTP server for the exporter.

use crate::metrics::ExporterMetrics;
use anyhow::Result;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub metrics: Arc<ExporterMetrics>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
        }
    }
}

type AppStateArc = Arc<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

/// Build the router serving the scrape and health endpoints.
pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the exposition text. Gathering the registry reads and resets every
/// aggregation window as a side effect.
async fn scrape(State(state): State<AppStateArc>) -> String {
    state.metrics.export()
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Run the HTTP server
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
