//! HTTP API tests against an in-process router with mock services.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestConfig, TestFixture};
use subscout_core::{
    testing::{RecordedCatalogQuery, RecordedSubtitleQuery},
    MetadataError, PipelineOutcome, SubtitleError,
};

// =============================================================================
// Health, config and metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["metadata"]["backend"], "tmdb");
    assert_eq!(response.body["metadata"]["api_key_configured"], true);
    assert_eq!(response.body["opensubtitles"]["username"], "alice");
    assert_eq!(response.body["opensubtitles"]["password_configured"], true);
    assert_eq!(response.body["llm"]["provider"], "open_ai");
    assert!(!response.text.contains("hunter2"));
    assert!(!response.text.contains("os-secret"));
    assert!(!response.text.contains("llm-secret"));
    assert!(!response.text.contains("tmdb-secret"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("subscout_http_requests_total"));
    assert!(response.text.contains("subscout_token_exchanges_total"));
}

// =============================================================================
// Movies
// =============================================================================

#[tokio::test]
async fn test_movie_search() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_search_results(
            "Inception",
            vec![
                fixtures::search_hit("27205", "Inception"),
                fixtures::search_hit("64956", "Inception: The Cobol Job"),
            ],
        )
        .await;

    let response = fixture.get("/api/v1/movies/search?q=Inception").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 2);
    assert_eq!(response.body["backend"], "mock");
    assert_eq!(response.body["results"][0]["id"], "27205");
    assert_eq!(
        fixture.catalog.recorded_queries().await,
        vec![RecordedCatalogQuery::Search {
            query: "Inception".to_string()
        }]
    );
}

#[tokio::test]
async fn test_movie_search_requires_query() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/movies/search?q=%20%20").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
    assert_eq!(fixture.catalog.query_count().await, 0);
}

#[tokio::test]
async fn test_movie_search_rate_limited() {
    let fixture = TestFixture::new().await;
    fixture
        .catalog
        .set_next_error(MetadataError::RateLimitExceeded)
        .await;

    let response = fixture.get("/api/v1/movies/search?q=Heat").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_movie_details() {
    let fixture = TestFixture::new().await;
    let mut record = fixtures::movie_record("27205", "Inception");
    record.year = Some(2010);
    fixture.catalog.add_movie(record).await;

    let response = fixture.get("/api/v1/movies/27205").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Inception");
    assert_eq!(response.body["year"], 2010);
}

#[tokio::test]
async fn test_movie_details_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/movies/tt0000000").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Subtitles
// =============================================================================

#[tokio::test]
async fn test_subtitle_search_by_id_uses_primary_language() {
    let fixture = TestFixture::new().await;
    fixture
        .subtitles
        .set_id_results("27205", "zh-CN", vec![fixtures::subtitle_record(9, "zh-CN")])
        .await;

    let response = fixture.get("/api/v1/subtitles/search?id=27205").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["language"], "zh-CN");
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["results"][0]["id"], 9);
}

#[tokio::test]
async fn test_subtitle_search_falls_back_to_title() {
    let fixture = TestFixture::new().await;
    fixture
        .subtitles
        .set_title_results("Inception", "en", vec![fixtures::subtitle_record(3, "en")])
        .await;

    let response = fixture
        .get("/api/v1/subtitles/search?id=27205&title=Inception&year=2010&language=en")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(
        fixture.subtitles.recorded_queries().await,
        vec![
            RecordedSubtitleQuery::ById {
                external_id: "27205".to_string(),
                language: "en".to_string(),
            },
            RecordedSubtitleQuery::ByTitle {
                title: "Inception".to_string(),
                year: Some(2010),
                language: "en".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_subtitle_search_requires_title_or_id() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/subtitles/search?language=en").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(fixture.subtitles.recorded_queries().await.is_empty());
}

#[tokio::test]
async fn test_subtitle_search_provider_timeout() {
    let fixture = TestFixture::new().await;
    fixture.subtitles.fail_id_search("zh-CN").await;

    let response = fixture.get("/api/v1/subtitles/search?id=27205").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_subtitle_download_writes_into_download_dir() {
    let fixture = TestFixture::new().await;
    fixture
        .subtitles
        .set_link(42, "https://dl.example.com/download/42/Inception.2010.srt")
        .await;

    let response = fixture
        .post("/api/v1/subtitles/download", json!({ "subtitle_id": 42 }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["file_name"], "Inception.2010.srt");
    let path = fixture.download_dir.join("Inception.2010.srt");
    assert!(path.exists());
    assert_eq!(
        response.body["size_bytes"],
        std::fs::metadata(&path).unwrap().len()
    );
    assert_eq!(fixture.subtitles.login_count().await, 1);
}

#[tokio::test]
async fn test_subtitle_download_provider_error() {
    let fixture = TestFixture::new().await;
    fixture
        .subtitles
        .set_next_error(SubtitleError::ApiError {
            status: 500,
            message: "boom".to_string(),
        })
        .await;

    let response = fixture
        .post(
            "/api/v1/subtitles/download",
            json!({ "subtitle_id": 42, "file_name": "x.srt" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_subtitle_download_rejects_malformed_body() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_raw("/api/v1/subtitles/download", "{\"subtitle_id\": \"abc\"}")
        .await;

    assert!(response.status.is_client_error());
    assert_eq!(fixture.subtitles.login_count().await, 0);
}

#[tokio::test]
async fn test_subtitle_translate() {
    let fixture = TestFixture::new().await;
    fixture
        .llm
        .push_response("1\n00:00:01,000 --> 00:00:02,000\n你好\n")
        .await;

    let response = fixture
        .post(
            "/api/v1/subtitles/translate",
            json!({ "content": "1\n00:00:01,000 --> 00:00:02,000\nHello\n" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["target_language"], "zh-CN");
    assert!(response.body["content"].as_str().unwrap().contains("你好"));

    let requests = fixture.llm.recorded_requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Hello"));
}

#[tokio::test]
async fn test_subtitle_translate_rejects_empty_content() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/subtitles/translate", json!({ "content": "   " }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.llm.request_count().await, 0);
}

#[tokio::test]
async fn test_subtitle_translate_empty_completion() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/subtitles/translate",
            json!({ "content": "Hello", "target_language": "ja" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_history_empty_before_any_download() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/subtitles/history").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 0);
}

#[tokio::test]
async fn test_history_lists_downloads() {
    let fixture = TestFixture::new().await;
    fixture
        .post(
            "/api/v1/subtitles/download",
            json!({ "subtitle_id": 5, "file_name": "five.srt" }),
        )
        .await;

    let response = fixture.get("/api/v1/subtitles/history").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["files"][0]["name"], "subtitle-5.srt");
}

// =============================================================================
// Directory monitor
// =============================================================================

#[tokio::test]
async fn test_watcher_status_without_monitor() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/watcher/status").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_watcher_status_with_monitor() {
    let fixture = TestFixture::with_config(TestConfig {
        enable_monitor: true,
        ..TestConfig::default()
    })
    .await;

    let response = fixture.get("/api/v1/watcher/status").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["watching"], false);
    assert_eq!(response.body["ready"], false);
    assert_eq!(response.body["processed_files"], 0);
}

#[tokio::test]
async fn test_manual_process_runs_pipeline() {
    let fixture = TestFixture::with_config(TestConfig {
        enable_monitor: true,
        ..TestConfig::default()
    })
    .await;
    let dir = fixture.movie_dir("Inception");
    fixture.processor.set_outcome(PipelineOutcome::NoSubtitles {
        movie_title: "Inception".to_string(),
    });

    let response = fixture
        .post("/api/v1/watcher/process", json!({ "path": dir }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"], "no_subtitles");
    assert_eq!(response.body["movie_title"], "Inception");
    assert_eq!(
        fixture.processor.calls(),
        vec![std::fs::canonicalize(&dir).unwrap()]
    );
}

#[tokio::test]
async fn test_manual_process_rejects_watch_root() {
    let fixture = TestFixture::with_config(TestConfig {
        enable_monitor: true,
        ..TestConfig::default()
    })
    .await;

    let response = fixture
        .post(
            "/api/v1/watcher/process",
            json!({ "path": fixture.library_dir }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.processor.call_count(), 0);
}

#[tokio::test]
async fn test_manual_process_missing_directory() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/watcher/process",
            json!({ "path": fixture.library_dir.join("nope") }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_process_rejects_file() {
    let fixture = TestFixture::new().await;
    let dir = fixture.movie_dir("Heat");
    let file = dir.join("Heat.mkv");
    std::fs::write(&file, b"x").unwrap();

    let response = fixture
        .post("/api/v1/watcher/process", json!({ "path": file }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(fixture.processor.call_count(), 0);
}

#[tokio::test]
async fn test_manual_process_waits_for_run() {
    let fixture = TestFixture::new().await;
    let dir = fixture.movie_dir("Heat");
    fixture.processor.set_delay(Duration::from_millis(20));

    let response = fixture
        .post("/api/v1/watcher/process", json!({ "path": dir }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["outcome"], "no_candidate");
}
