//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Directory pipeline runs and their outcomes
//! - Subtitle downloads, token exchanges and translations
//! - External services (metadata, OpenSubtitles, LLM)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};
use std::time::Instant;

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Directory pipeline runs by outcome.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_pipeline_runs_total", "Total directory pipeline runs"),
        &["outcome"], // see PipelineOutcome::label, plus "failed"
    )
    .unwrap()
});

/// Pipeline run duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subscout_pipeline_duration_seconds",
            "Duration of directory pipeline runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Files handed off by the directory monitor.
pub static WATCH_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subscout_watch_events_total",
            "Filesystem events accepted by the directory monitor",
        ),
        &["kind"], // "file", "directory"
    )
    .unwrap()
});

// =============================================================================
// Subtitle Metrics
// =============================================================================

/// Subtitle downloads by result.
pub static SUBTITLE_DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_subtitle_downloads_total", "Total subtitle downloads"),
        &["result"], // "success", "failed", "skipped"
    )
    .unwrap()
});

/// Download token exchanges.
pub static TOKEN_EXCHANGES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "subscout_token_exchanges_total",
        "Total OpenSubtitles login token exchanges",
    )
    .unwrap()
});

/// Subtitle translations by result.
pub static TRANSLATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_translations_total", "Total subtitle translations"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subscout_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subscout_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subscout_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one external call: its duration and whether it succeeded.
pub fn record_external<T, E>(
    service: &str,
    operation: &str,
    started: Instant,
    result: &Result<T, E>,
) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(started.elapsed().as_secs_f64());
    let status = if result.is_ok() { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(WATCH_EVENTS.clone()),
        // Subtitles
        Box::new(SUBTITLE_DOWNLOADS.clone()),
        Box::new(TOKEN_EXCHANGES.clone()),
        Box::new(TRANSLATIONS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
