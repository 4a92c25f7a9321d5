//! Mock subtitle provider for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::subtitles::{
    Credentials, SubtitleDownloader, SubtitleError, SubtitleRecord, SubtitleSearch,
};

/// A recorded subtitle search for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedSubtitleQuery {
    ById {
        external_id: String,
        language: String,
    },
    ByTitle {
        title: String,
        year: Option<u32>,
        language: String,
    },
}

const DEFAULT_CONTENT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n";

/// Mock implementation of both subtitle provider traits.
///
/// Provides controllable behavior for testing:
/// - Search results keyed by (id or title, language); anything else finds nothing
/// - Login tokens numbered `token-1`, `token-2`, ... per exchange
/// - Download links default to `https://dl.example.com/download/{id}/subtitle-{id}.srt`
/// - Fetches return a small SRT document unless configured otherwise
///
/// # Example
///
/// ```rust,ignore
/// use subscout_core::testing::{fixtures, MockSubtitleService};
///
/// let service = MockSubtitleService::new();
/// service
///     .set_id_results("27205", "en", vec![fixtures::subtitle_record(1, "en")])
///     .await;
/// assert_eq!(service.search_by_id("27205", "en").await?.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockSubtitleService {
    /// Results by (external id, language).
    id_results: Arc<RwLock<HashMap<(String, String), Vec<SubtitleRecord>>>>,
    /// Results by (title, language).
    title_results: Arc<RwLock<HashMap<(String, String), Vec<SubtitleRecord>>>>,
    /// Languages whose id search fails.
    failing_languages: Arc<RwLock<HashSet<String>>>,
    /// Recorded searches.
    queries: Arc<RwLock<Vec<RecordedSubtitleQuery>>>,
    /// Number of token exchanges.
    logins: Arc<RwLock<u32>>,
    /// Download links by file id.
    links: Arc<RwLock<HashMap<u64, String>>>,
    /// Recorded (file id, token) link requests.
    link_requests: Arc<RwLock<Vec<(u64, String)>>>,
    /// Recorded fetched URLs.
    fetches: Arc<RwLock<Vec<String>>>,
    /// Bytes returned by `fetch`.
    content: Arc<RwLock<Vec<u8>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<SubtitleError>>>,
}

impl Default for MockSubtitleService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubtitleService {
    /// Create a new mock with no results.
    pub fn new() -> Self {
        Self {
            id_results: Arc::new(RwLock::new(HashMap::new())),
            title_results: Arc::new(RwLock::new(HashMap::new())),
            failing_languages: Arc::new(RwLock::new(HashSet::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            logins: Arc::new(RwLock::new(0)),
            links: Arc::new(RwLock::new(HashMap::new())),
            link_requests: Arc::new(RwLock::new(Vec::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            content: Arc::new(RwLock::new(DEFAULT_CONTENT.as_bytes().to_vec())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Search Configuration
    // =========================================================================

    /// Set the results of an id search in one language.
    pub async fn set_id_results(
        &self,
        external_id: &str,
        language: &str,
        results: Vec<SubtitleRecord>,
    ) {
        self.id_results
            .write()
            .await
            .insert((external_id.to_string(), language.to_string()), results);
    }

    /// Set the results of a title search in one language.
    pub async fn set_title_results(
        &self,
        title: &str,
        language: &str,
        results: Vec<SubtitleRecord>,
    ) {
        self.title_results
            .write()
            .await
            .insert((title.to_string(), language.to_string()), results);
    }

    /// Make every id search in `language` fail.
    pub async fn fail_id_search(&self, language: &str) {
        self.failing_languages
            .write()
            .await
            .insert(language.to_string());
    }

    // =========================================================================
    // Download Configuration
    // =========================================================================

    /// Set the download link returned for a file id.
    pub async fn set_link(&self, file_id: u64, url: &str) {
        self.links.write().await.insert(file_id, url.to_string());
    }

    /// Set the bytes returned by every fetch.
    pub async fn set_content(&self, content: impl Into<Vec<u8>>) {
        *self.content.write().await = content.into();
    }

    /// Make the next operation fail with the given error.
    pub async fn set_next_error(&self, error: SubtitleError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub async fn recorded_queries(&self) -> Vec<RecordedSubtitleQuery> {
        self.queries.read().await.clone()
    }

    pub async fn login_count(&self) -> u32 {
        *self.logins.read().await
    }

    pub async fn recorded_link_requests(&self) -> Vec<(u64, String)> {
        self.link_requests.read().await.clone()
    }

    pub async fn recorded_fetches(&self) -> Vec<String> {
        self.fetches.read().await.clone()
    }

    async fn take_error(&self) -> Option<SubtitleError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl SubtitleSearch for MockSubtitleService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_by_id(
        &self,
        external_id: &str,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        self.queries.write().await.push(RecordedSubtitleQuery::ById {
            external_id: external_id.to_string(),
            language: language.to_string(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing_languages.read().await.contains(language) {
            return Err(SubtitleError::Timeout);
        }

        Ok(self
            .id_results
            .read()
            .await
            .get(&(external_id.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_by_title(
        &self,
        title: &str,
        year: Option<u32>,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        self.queries.write().await.push(RecordedSubtitleQuery::ByTitle {
            title: title.to_string(),
            year,
            language: language.to_string(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        Ok(self
            .title_results
            .read()
            .await
            .get(&(title.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SubtitleDownloader for MockSubtitleService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String, SubtitleError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if !credentials.is_complete() {
            return Err(SubtitleError::AuthenticationFailed(
                "missing credentials".to_string(),
            ));
        }

        let mut logins = self.logins.write().await;
        *logins += 1;
        Ok(format!("token-{}", *logins))
    }

    async fn request_link(&self, file_id: u64, token: &str) -> Result<String, SubtitleError> {
        self.link_requests
            .write()
            .await
            .push((file_id, token.to_string()));

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        Ok(self
            .links
            .read()
            .await
            .get(&file_id)
            .cloned()
            .unwrap_or_else(|| {
                format!(
                    "https://dl.example.com/download/{}/subtitle-{}.srt",
                    file_id, file_id
                )
            }))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SubtitleError> {
        self.fetches.write().await.push(url.to_string());

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        Ok(self.content.read().await.clone())
    }
}
