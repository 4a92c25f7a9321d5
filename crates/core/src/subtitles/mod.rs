//! Subtitle search, ranking and download.
//!
//! [`SubtitleSearch`] and [`SubtitleDownloader`] are the seams to the
//! subtitle provider; [`OpenSubtitlesClient`] implements both against the
//! OpenSubtitles REST API.

mod download;
mod opensubtitles;
mod ranking;
mod resolver;
mod types;

pub use download::{
    filename_from_link, find_existing_subtitle, list_download_history, Clock, DownloadManager,
    DownloadOutcome, DownloadedFile, SessionToken, SystemClock,
};
pub use opensubtitles::OpenSubtitlesClient;
pub use ranking::{compare_quality, quality_score, rank, select_best, FALLBACK_LANGUAGES};
pub use resolver::SubtitleResolver;
pub use types::{Credentials, SubtitleRecord};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when searching or downloading subtitles.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider did not answer in time.
    #[error("Request timed out")]
    Timeout,

    /// The provider could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Login was rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, credentials, etc.).
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// The download endpoint answered without a link.
    #[error("No download link returned for file {0}")]
    MissingLink(u64),

    /// Writing the subtitle file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SubtitleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SubtitleError::Timeout
        } else if e.is_connect() {
            SubtitleError::ConnectionFailed(e.to_string())
        } else {
            SubtitleError::Http(e.to_string())
        }
    }
}

/// Subtitle search provider.
#[async_trait]
pub trait SubtitleSearch: Send + Sync {
    /// Provider name used in logs and metrics.
    fn name(&self) -> &str;

    /// Subtitles for a catalog id (TMDB id, or IMDB id starting with `tt`).
    async fn search_by_id(
        &self,
        external_id: &str,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError>;

    /// Free-text subtitle search.
    async fn search_by_title(
        &self,
        title: &str,
        year: Option<u32>,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError>;
}

/// Subtitle file delivery: token exchange, one-time links and the file itself.
#[async_trait]
pub trait SubtitleDownloader: Send + Sync {
    /// Exchange account credentials for a session token.
    async fn authenticate(&self, credentials: &Credentials) -> Result<String, SubtitleError>;

    /// Request a one-time download link for a subtitle file.
    async fn request_link(&self, file_id: u64, token: &str) -> Result<String, SubtitleError>;

    /// Fetch the bytes behind a download link.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SubtitleError>;
}
