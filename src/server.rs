//! HTTP API exposing the analysis.
//!
//! Routes:
//! - `GET /health` - liveness and version
//! - `GET|POST /api/analysis` - run the pipeline now and return the result

use crate::analysis::{run_analysis, NarrativeProducer};
use crate::store::RecordStore;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Shared handler state.
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub producer: NarrativeProducer,
}

type SharedState = Arc<AppState>;

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analysis", get(analysis).post(analysis))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analysis(State(state): State<SharedState>) -> Response {
    match run_analysis(state.store.as_ref(), &state.producer, Utc::now()).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis.response())).into_response(),
        Err(e) => {
            error!("Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "analysis failed" })),
            )
                .into_response()
        }
    }
}

/// Serve the API on `bind` until Ctrl-C.
pub async fn serve(state: SharedState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on http://{}", bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
