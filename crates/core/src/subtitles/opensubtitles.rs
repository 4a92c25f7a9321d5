//! OpenSubtitles REST API client.
//!
//! Every API call carries the consumer `Api-Key` and a `User-Agent`.
//! Downloads are two-step: an authenticated `/download` call returns a
//! one-time link, which is then fetched with only the `User-Agent` header.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::{Credentials, SubtitleRecord};
use super::{SubtitleDownloader, SubtitleError, SubtitleSearch};
use crate::config::OpenSubtitlesConfig;
use crate::metrics::record_external;

const DEFAULT_BASE_URL: &str = "https://api.opensubtitles.com/api/v1";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// OpenSubtitles API client.
pub struct OpenSubtitlesClient {
    api: Client,
    files: Client,
    base_url: String,
    api_key: String,
    user_agent: String,
}

impl OpenSubtitlesClient {
    /// Create a new OpenSubtitles client.
    pub fn new(config: &OpenSubtitlesConfig) -> Result<Self, SubtitleError> {
        if config.api_key.is_empty() {
            return Err(SubtitleError::NotConfigured(
                "OpenSubtitles API key is required".to_string(),
            ));
        }

        let api = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        let files = Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs as u64))
            .build()?;

        Ok(Self {
            api,
            files,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
            user_agent: config
                .user_agent
                .clone()
                .filter(|ua| !ua.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }

    fn with_api_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
    }

    async fn search(
        &self,
        params: Vec<(&str, String)>,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        let url = format!("{}/subtitles", self.base_url);
        let response = self
            .with_api_headers(self.api.get(&url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(SubtitleError::NotConfigured(
                "Invalid OpenSubtitles API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubtitleError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            SubtitleError::ParseError(format!("Failed to parse subtitle search response: {}", e))
        })?;

        let records: Vec<SubtitleRecord> = body
            .data
            .into_iter()
            .filter_map(|item| item.attributes.into_record())
            .collect();
        debug!(count = records.len(), "OpenSubtitles search returned");
        Ok(records)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, SubtitleError> {
        if !credentials.is_complete() {
            return Err(SubtitleError::NotConfigured(
                "OpenSubtitles username and password are required".to_string(),
            ));
        }

        info!("Logging in to OpenSubtitles");
        let response = self
            .with_api_headers(self.api.post(format!("{}/login", self.base_url)))
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(SubtitleError::AuthenticationFailed(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubtitleError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            SubtitleError::ParseError(format!("Failed to parse login response: {}", e))
        })?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SubtitleError::AuthenticationFailed("no token in response".to_string()))
    }

    async fn link(&self, file_id: u64, token: &str) -> Result<String, SubtitleError> {
        let response = self
            .with_api_headers(self.api.post(format!("{}/download", self.base_url)))
            .bearer_auth(token)
            .json(&DownloadRequest { file_id })
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(SubtitleError::AuthenticationFailed(
                "download token rejected".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubtitleError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: DownloadResponse = response.json().await.map_err(|e| {
            SubtitleError::ParseError(format!("Failed to parse download response: {}", e))
        })?;

        if let Some(remaining) = body.remaining {
            debug!(file_id, remaining, "Download link issued");
        }

        body.link
            .filter(|l| !l.is_empty())
            .ok_or(SubtitleError::MissingLink(file_id))
    }

    async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, SubtitleError> {
        let response = self
            .files
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubtitleError::ApiError {
                status: status.as_u16(),
                message: format!("subtitle fetch failed for {}", url),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Query parameter for a catalog id: IMDB ids go out as `imdb_id` without the `tt`.
fn id_param(external_id: &str) -> (&'static str, String) {
    match external_id.strip_prefix("tt") {
        Some(numeric) => {
            let trimmed = numeric.trim_start_matches('0');
            ("imdb_id", if trimmed.is_empty() { "0" } else { trimmed }.to_string())
        }
        None => ("tmdb_id", external_id.to_string()),
    }
}

#[async_trait]
impl SubtitleSearch for OpenSubtitlesClient {
    fn name(&self) -> &str {
        "opensubtitles"
    }

    async fn search_by_id(
        &self,
        external_id: &str,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        info!(external_id, language, "Searching subtitles by id");
        let started = Instant::now();
        let result = self
            .search(vec![id_param(external_id), ("languages", language.to_string())])
            .await;
        record_external("opensubtitles", "search_by_id", started, &result);
        result
    }

    async fn search_by_title(
        &self,
        title: &str,
        year: Option<u32>,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        info!(title, ?year, language, "Searching subtitles by title");
        let mut params = vec![("query", title.to_string())];
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }
        params.push(("languages", language.to_string()));

        let started = Instant::now();
        let result = self.search(params).await;
        record_external("opensubtitles", "search_by_title", started, &result);
        result
    }
}

#[async_trait]
impl SubtitleDownloader for OpenSubtitlesClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String, SubtitleError> {
        let started = Instant::now();
        let result = self.login(credentials).await;
        record_external("opensubtitles", "login", started, &result);
        result
    }

    async fn request_link(&self, file_id: u64, token: &str) -> Result<String, SubtitleError> {
        let started = Instant::now();
        let result = self.link(file_id, token).await;
        record_external("opensubtitles", "download_link", started, &result);
        result
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SubtitleError> {
        let started = Instant::now();
        let result = self.fetch_file(url).await;
        record_external("opensubtitles", "fetch", started, &result);
        result
    }
}

// ============================================================================
// OpenSubtitles API Types (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct DownloadRequest {
    file_id: u64,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    link: Option<String>,
    #[serde(default)]
    remaining: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    attributes: SubtitleAttributes,
}

#[derive(Debug, Deserialize)]
struct SubtitleAttributes {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    download_count: Option<u64>,
    #[serde(default)]
    new_download_count: Option<u64>,
    #[serde(default)]
    ratings: Option<f64>,
    #[serde(default)]
    release: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    hd: Option<bool>,
    #[serde(default)]
    fps: Option<f64>,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    ai_translated: Option<bool>,
    #[serde(default)]
    machine_translated: Option<bool>,
    #[serde(default)]
    files: Vec<SubtitleFile>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFile {
    file_id: u64,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_size: Option<u64>,
}

fn parse_upload_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|d| d.and_utc())
        })
}

impl SubtitleAttributes {
    /// Entries without a downloadable file are dropped.
    fn into_record(self) -> Option<SubtitleRecord> {
        let file = self.files.into_iter().next()?;

        // A zero download_count falls through to new_download_count.
        let download_count = self
            .download_count
            .filter(|c| *c > 0)
            .or(self.new_download_count)
            .unwrap_or(0);

        Some(SubtitleRecord {
            id: file.file_id,
            file_name: file
                .file_name
                .unwrap_or_else(|| format!("{}.srt", file.file_id)),
            language: self.language.unwrap_or_default(),
            download_count,
            rating: self.ratings.unwrap_or(0.0),
            release: self.release,
            size: file.file_size,
            upload_date: self.upload_date.as_deref().and_then(parse_upload_date),
            hd: self.hd.unwrap_or(false),
            fps: self.fps,
            comments: self.comments.filter(|c| !c.is_empty()),
            ai_translated: self.ai_translated.unwrap_or(false),
            machine_translated: self.machine_translated.unwrap_or(false),
        })
    }
}
