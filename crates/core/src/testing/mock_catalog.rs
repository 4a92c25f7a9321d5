//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, MovieCatalog, MovieRecord, MovieSearchHit};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Search { query: String },
    Details { id: String },
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Search results keyed by exact query string (unknown queries return nothing)
/// - Movie records keyed by catalog id
/// - Per-query and one-shot failures
/// - Query recording for assertions
///
/// # Example
///
/// ```rust,ignore
/// use subscout_core::testing::{fixtures, MockMovieCatalog};
///
/// let catalog = MockMovieCatalog::new();
/// catalog
///     .set_search_results("Inception", vec![fixtures::search_hit("27205", "Inception")])
///     .await;
/// catalog.add_movie(fixtures::movie_record("27205", "Inception")).await;
/// ```
#[derive(Debug)]
pub struct MockMovieCatalog {
    /// Search hits by query.
    results: Arc<RwLock<HashMap<String, Vec<MovieSearchHit>>>>,
    /// Movie records by catalog id.
    movies: Arc<RwLock<HashMap<String, MovieRecord>>>,
    /// Queries that fail with an HTTP-like error.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<MetadataError>>>,
}

impl Default for MockMovieCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMovieCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            movies: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the hits returned for an exact query.
    pub async fn set_search_results(&self, query: &str, hits: Vec<MovieSearchHit>) {
        self.results.write().await.insert(query.to_string(), hits);
    }

    /// Add a movie record, returned by `get_details` for its id.
    pub async fn add_movie(&self, movie: MovieRecord) {
        self.movies
            .write()
            .await
            .insert(movie.external_id.clone(), movie);
    }

    /// Make every search for `query` fail.
    pub async fn fail_query(&self, query: &str) {
        self.failing.write().await.insert(query.to_string());
    }

    /// Make the next operation fail with the given error.
    pub async fn set_next_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Number of searches and detail lookups made.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Clear recorded queries.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    async fn take_error(&self) -> Option<MetadataError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl MovieCatalog for MockMovieCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError> {
        self.queries.write().await.push(RecordedCatalogQuery::Search {
            query: query.to_string(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing.read().await.contains(query) {
            return Err(MetadataError::ApiError {
                status: 503,
                message: "mock search failure".to_string(),
            });
        }

        Ok(self
            .results
            .read()
            .await
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_details(&self, id: &str) -> Result<MovieRecord, MetadataError> {
        self.queries.write().await.push(RecordedCatalogQuery::Details {
            id: id.to_string(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        self.movies
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("movie {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_unknown_query_is_empty() {
        let catalog = MockMovieCatalog::new();
        assert!(catalog.search("nothing").await.unwrap().is_empty());
        assert!(matches!(
            catalog.get_details("1").await,
            Err(MetadataError::NotFound(_))
        ));
        assert_eq!(catalog.query_count().await, 2);
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let catalog = MockMovieCatalog::new();
        catalog.add_movie(fixtures::movie_record("1", "Alien")).await;
        catalog.set_next_error(MetadataError::RateLimitExceeded).await;

        assert!(catalog.get_details("1").await.is_err());
        assert_eq!(catalog.get_details("1").await.unwrap().title, "Alien");
    }
}
