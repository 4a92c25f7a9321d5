//! Subtitle API handlers: interactive search, download, translation and history.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use subscout_core::{
    list_download_history, DownloadedFile, SubtitleError, SubtitleRecord, TranslationError,
};
use tracing::{info, warn};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubtitleSearchParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
    /// Catalog id (TMDB numeric or IMDB `tt` id).
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubtitleSearchResponse {
    pub language: String,
    pub results: Vec<SubtitleRecord>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub subtitle_id: u64,
    /// Name used when the provider link does not carry one.
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub path: String,
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub content: String,
    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub content: String,
    pub target_language: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub files: Vec<DownloadedFile>,
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/subtitles/search?title=&year=&language=&id=
///
/// Search one language, by id first and then by title.
pub async fn search_subtitles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubtitleSearchParams>,
) -> Result<Json<SubtitleSearchResponse>, impl IntoResponse> {
    let title = params.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let id = params.id.as_deref().map(str::trim).filter(|i| !i.is_empty());
    if title.is_none() && id.is_none() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Either 'title' or 'id' is required",
        ));
    }

    let resolver = state.subtitles();
    let language = params
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| resolver.primary_language().to_string());

    info!(?title, ?id, year = ?params.year, %language, "Subtitle search");

    match resolver
        .search_direct(id, title, params.year, &language)
        .await
    {
        Ok(results) => Ok(Json(SubtitleSearchResponse {
            language,
            count: results.len(),
            results,
        })),
        Err(e) => {
            warn!(error = %e, "Subtitle search failed");
            Err(map_subtitle_error(e))
        }
    }
}

/// POST /api/v1/subtitles/download
///
/// Download a subtitle file into the configured download directory.
pub async fn download_subtitle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, impl IntoResponse> {
    if body.subtitle_id == 0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "subtitle_id must be a provider file id",
        ));
    }

    let fallback = body
        .file_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("{}.srt", body.subtitle_id));

    let path = match state
        .downloads()
        .download_file(body.subtitle_id, state.download_dir(), &fallback)
        .await
    {
        Ok(path) => path,
        Err(e) => {
            warn!(subtitle_id = body.subtitle_id, error = %e, "Subtitle download failed");
            return Err(map_subtitle_error(e));
        }
    };

    let size_bytes = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Downloaded file unreadable: {}", e),
            ))
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(fallback);

    Ok(Json(DownloadResponse {
        path: path.display().to_string(),
        file_name,
        size_bytes,
    }))
}

/// POST /api/v1/subtitles/translate
///
/// Translate submitted subtitle text with the configured LLM.
pub async fn translate_subtitle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, impl IntoResponse> {
    if body.content.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Subtitle content must not be empty",
        ));
    }

    let translation = state.translation();
    let target_language = body
        .target_language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| translation.target_language().to_string());

    info!(%target_language, chars = body.content.len(), "Subtitle translation");

    match translation
        .translate_text(&body.content, &target_language)
        .await
    {
        Ok(content) => Ok(Json(TranslateResponse {
            content,
            target_language,
        })),
        Err(e) => {
            warn!(error = %e, "Subtitle translation failed");
            let status = match e {
                TranslationError::Llm(_) | TranslationError::Empty => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                TranslationError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(error_response(status, e.to_string()))
        }
    }
}

/// GET /api/v1/subtitles/history
///
/// Files in the download directory, newest first.
pub async fn download_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, impl IntoResponse> {
    match list_download_history(state.download_dir()).await {
        Ok(files) => Ok(Json(HistoryResponse {
            count: files.len(),
            files,
        })),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to list downloads: {}", e),
        )),
    }
}

fn map_subtitle_error(e: SubtitleError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        SubtitleError::ApiError { status: 404, .. } | SubtitleError::MissingLink(_) => {
            StatusCode::NOT_FOUND
        }
        SubtitleError::ApiError { status: 429, .. }
        | SubtitleError::Timeout
        | SubtitleError::ConnectionFailed(_)
        | SubtitleError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}
