//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock services injected, so every endpoint can be exercised
//! without network access.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use subscout_core::{
    load_config_from_str,
    testing::{MockDirectoryProcessor, MockLlmClient, MockMovieCatalog, MockSubtitleService},
    Credentials, DirectoryMonitor, DirectoryProcessor, DownloadManager, SubtitleResolver,
    TranslationFallback, WatcherConfig,
};
use subscout_server::state::AppState;

/// Re-export fixtures for test convenience
pub use subscout_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3001

[metadata]
backend = "tmdb"

[metadata.tmdb]
api_key = "tmdb-secret"

[opensubtitles]
api_key = "os-secret"
username = "alice"
password = "hunter2"

[llm]
provider = "open_ai"
model = "deepseek-chat"
api_key = "llm-secret"
"#;

/// Options for building a [`TestFixture`].
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Attach a (not started) directory monitor watching `library_dir`.
    pub enable_monitor: bool,
    pub preferred_languages: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_monitor: false,
            preferred_languages: vec!["zh-CN".to_string(), "zh".to_string(), "en".to_string()],
        }
    }
}

/// Test fixture wiring the router to mock services.
pub struct TestFixture {
    pub router: Router,
    pub catalog: Arc<MockMovieCatalog>,
    pub llm: Arc<MockLlmClient>,
    pub subtitles: Arc<MockSubtitleService>,
    pub processor: Arc<MockDirectoryProcessor>,
    pub monitor: Option<Arc<DirectoryMonitor>>,
    /// Where API downloads land.
    pub download_dir: PathBuf,
    /// Watch root when the monitor is enabled.
    pub library_dir: PathBuf,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let download_dir = temp_dir.path().join("downloads");
        let library_dir = temp_dir.path().join("library");
        std::fs::create_dir_all(&library_dir).expect("Failed to create library dir");

        let mut config = load_config_from_str(TEST_CONFIG).expect("Test config is valid");
        config.pipeline.download_dir = download_dir.clone();
        config.pipeline.preferred_languages = test_config.preferred_languages.clone();

        // Create mocks
        let catalog = Arc::new(MockMovieCatalog::new());
        let llm = Arc::new(MockLlmClient::new());
        let subtitles = Arc::new(MockSubtitleService::new());
        let processor = Arc::new(MockDirectoryProcessor::new());

        let resolver = Arc::new(SubtitleResolver::new(
            subtitles.clone(),
            test_config.preferred_languages.clone(),
        ));
        let downloads = Arc::new(
            DownloadManager::new(subtitles.clone(), Credentials::new("alice", "hunter2"))
                .expect("Credentials are complete"),
        );
        let translation = TranslationFallback::new(
            llm.clone(),
            test_config.preferred_languages.clone(),
            "zh-CN",
        );

        let monitor = if test_config.enable_monitor {
            config.watcher = WatcherConfig {
                enabled: true,
                root: Some(library_dir.clone()),
                ..WatcherConfig::default()
            };
            let monitor = DirectoryMonitor::new(
                config.watcher.clone(),
                processor.clone() as Arc<dyn DirectoryProcessor>,
            )
            .expect("Failed to create monitor");
            Some(Arc::new(monitor))
        } else {
            None
        };

        let state = Arc::new(AppState::new(
            config,
            catalog.clone(),
            resolver,
            downloads,
            translation,
            processor.clone(),
            monitor.clone(),
        ));

        let router = subscout_server::api::create_router(state);

        Self {
            router,
            catalog,
            llm,
            subtitles,
            processor,
            monitor,
            download_dir,
            library_dir,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = match body {
            Some(json) => {
                request_builder = request_builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_string(&json).unwrap())
            }
            None => Body::empty(),
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }

    /// Create a movie directory under the watch root.
    pub fn movie_dir(&self, name: &str) -> PathBuf {
        let dir = self.library_dir.join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create movie dir");
        dir
    }
}
