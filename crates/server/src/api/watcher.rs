//! Directory monitor API handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use subscout_core::{PipelineError, PipelineOutcome, WatcherStatus};
use tracing::{info, warn};

use super::handlers::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub path: PathBuf,
}

/// GET /api/v1/watcher/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WatcherStatus>, impl IntoResponse> {
    match state.monitor() {
        Some(monitor) => Ok(Json(monitor.status())),
        None => Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Directory monitor not enabled",
        )),
    }
}

/// POST /api/v1/watcher/process
///
/// Run the pipeline for one directory now. Runs already in progress for the
/// same directory make this return the `busy` outcome.
pub async fn process_directory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProcessRequest>,
) -> Result<Json<PipelineOutcome>, impl IntoResponse> {
    let dir = match tokio::fs::canonicalize(&body.path).await {
        Ok(dir) => dir,
        Err(_) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                format!("Directory not found: {}", body.path.display()),
            ))
        }
    };

    if !dir.is_dir() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Not a directory: {}", dir.display()),
        ));
    }
    if state.monitor().is_some_and(|m| m.root() == dir) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "The watch root itself cannot be processed",
        ));
    }

    info!(dir = %dir.display(), "Manual directory run");
    match state.processor().process_directory(&dir).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Manual directory run failed");
            let status = match e {
                PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::SERVICE_UNAVAILABLE,
            };
            Err(error_response(status, e.to_string()))
        }
    }
}
