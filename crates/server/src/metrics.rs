//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the subscout server:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Directory monitor status (collected dynamically)
//! - Core pipeline, subtitle and external service metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subscout_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "subscout_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Monitor Metrics (collected dynamically)
// =============================================================================

/// Directory monitor ready state (1 = dispatching events, 0 = not).
pub static WATCHER_READY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "subscout_watcher_ready",
        "Whether the directory monitor is dispatching events (1) or not (0)",
    )
    .unwrap()
});

/// Video files handed off by the monitor.
pub static WATCHER_PROCESSED_FILES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "subscout_watcher_processed_files",
        "Video files handed off by the directory monitor since start",
    )
    .unwrap()
});

/// Directories with a pipeline run in progress.
pub static PIPELINE_ACTIVE_DIRECTORIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "subscout_pipeline_active_directories",
        "Directories currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Monitor
    registry.register(Box::new(WATCHER_READY.clone())).unwrap();
    registry
        .register(Box::new(WATCHER_PROCESSED_FILES.clone()))
        .unwrap();
    registry
        .register(Box::new(PIPELINE_ACTIVE_DIRECTORIES.clone()))
        .unwrap();

    // Core metrics (pipeline, subtitles, external services)
    for metric in subscout_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Some(monitor) = state.monitor() {
        let status = monitor.status();
        WATCHER_READY.set(if status.ready { 1 } else { 0 });
        WATCHER_PROCESSED_FILES.set(status.processed_files as i64);
    }
    if let Some(locks) = state.locks() {
        PIPELINE_ACTIVE_DIRECTORIES.set(locks.len() as i64);
    }
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());
static IMDB_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/tt\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace catalog IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = IMDB_SEGMENT.replace_all(path, "/{id}$1");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/v1/movies/27205"), "/api/v1/movies/{id}");
    }

    #[test]
    fn test_normalize_path_imdb() {
        assert_eq!(normalize_path("/api/v1/movies/tt1375666"), "/api/v1/movies/{id}");
    }

    #[test]
    fn test_normalize_path_unchanged() {
        assert_eq!(
            normalize_path("/api/v1/subtitles/search"),
            "/api/v1/subtitles/search"
        );
    }

    #[test]
    fn test_encode_includes_core_metrics() {
        subscout_core::metrics::TOKEN_EXCHANGES.inc();
        let text = encode_metrics();
        assert!(text.contains("subscout_token_exchanges_total"));
    }
}
