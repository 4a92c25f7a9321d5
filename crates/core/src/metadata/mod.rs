//! Movie metadata lookup.
//!
//! A [`MovieCatalog`] answers free-text searches and full detail lookups.
//! TMDB and imdb-api.com are supported; [`TitleResolver`] turns a video
//! file name into a catalog record, asking an LLM to clean up noisy release
//! names when the raw name finds nothing.

mod imdb;
mod resolver;
mod tmdb;
mod types;

pub use imdb::ImdbClient;
pub use resolver::{ResolvedMovie, TitleError, TitleResolver};
pub use tmdb::TmdbClient;
pub use types::{MovieRecord, MovieSearchHit};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{MetadataBackend, MetadataConfig};

/// Errors that can occur when talking to a metadata catalog.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A searchable movie catalog.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Backend name used in logs and metrics (e.g. "tmdb").
    fn name(&self) -> &str;

    /// Free-text movie search. Result order is the provider's relevance order.
    async fn search(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError>;

    /// Full record for a catalog id returned by [`MovieCatalog::search`].
    async fn get_details(&self, id: &str) -> Result<MovieRecord, MetadataError>;
}

/// Build the catalog selected by `[metadata] backend`.
pub fn create_catalog(config: &MetadataConfig) -> Result<Arc<dyn MovieCatalog>, MetadataError> {
    match config.backend {
        MetadataBackend::Tmdb => {
            let tmdb = config.tmdb.as_ref().ok_or_else(|| {
                MetadataError::NotConfigured("[metadata.tmdb] section is missing".to_string())
            })?;
            Ok(Arc::new(TmdbClient::new(tmdb)?))
        }
        MetadataBackend::Imdb => {
            let imdb = config.imdb.as_ref().ok_or_else(|| {
                MetadataError::NotConfigured("[metadata.imdb] section is missing".to_string())
            })?;
            Ok(Arc::new(ImdbClient::new(imdb)?))
        }
    }
}
