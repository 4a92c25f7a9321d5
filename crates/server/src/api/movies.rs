//! Movie metadata API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use subscout_core::{MetadataError, MovieRecord, MovieSearchHit};
use tracing::{info, warn};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MovieSearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct MovieSearchResponse {
    pub query: String,
    pub backend: String,
    pub results: Vec<MovieSearchHit>,
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/movies/search?q=
///
/// Search the configured metadata backend.
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieSearchParams>,
) -> Result<Json<MovieSearchResponse>, impl IntoResponse> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Query parameter 'q' is required",
        ));
    }

    let catalog = state.catalog();
    info!(query, backend = catalog.name(), "Movie search");

    match catalog.search(query).await {
        Ok(results) => Ok(Json(MovieSearchResponse {
            query: query.to_string(),
            backend: catalog.name().to_string(),
            count: results.len(),
            results,
        })),
        Err(e) => {
            warn!(query, error = %e, "Movie search failed");
            Err(map_metadata_error(e))
        }
    }
}

/// GET /api/v1/movies/{id}
///
/// Fetch full details for a catalog id.
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MovieRecord>, impl IntoResponse> {
    match state.catalog().get_details(&id).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            warn!(id, error = %e, "Movie lookup failed");
            Err(map_metadata_error(e))
        }
    }
}

fn map_metadata_error(e: MetadataError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
        MetadataError::RateLimitExceeded | MetadataError::NotConfigured(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}
