use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, movies, subtitles, watcher};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Movie metadata
        .route("/movies/search", get(movies::search_movies))
        .route("/movies/{id}", get(movies::get_movie))
        // Subtitles
        .route("/subtitles/search", get(subtitles::search_subtitles))
        .route("/subtitles/download", post(subtitles::download_subtitle))
        .route("/subtitles/translate", post(subtitles::translate_subtitle))
        .route("/subtitles/history", get(subtitles::download_history))
        // Directory monitor
        .route("/watcher/status", get(watcher::get_status))
        .route("/watcher/process", post(watcher::process_directory))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
