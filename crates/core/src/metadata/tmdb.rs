//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{year_from_date, MovieRecord, MovieSearchHit};
use super::{MetadataError, MovieCatalog};
use crate::config::TmdbConfig;
use crate::metrics::record_external;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const TOP_CAST: usize = 5;

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: &TmdbConfig) -> Result<Self, MetadataError> {
        if config.api_key.is_empty() {
            return Err(MetadataError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError> {
        let url = format!("{}/search/movie", self.base_url);

        debug!("TMDB movie search: query='{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(MetadataError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(MetadataError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let search_result: TmdbSearchResponse = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse movie search response: {}", e))
        })?;

        Ok(search_result
            .results
            .into_iter()
            .map(|r| r.into())
            .collect())
    }

    async fn get_movie(&self, id: &str) -> Result<MovieRecord, MetadataError> {
        let tmdb_id: u32 = id
            .parse()
            .map_err(|_| MetadataError::NotFound(format!("Invalid TMDB movie ID {}", id)))?;
        let url = format!("{}/movie/{}", self.base_url, tmdb_id);

        debug!("TMDB get movie: id={}", tmdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(MetadataError::NotFound(format!("Movie ID {}", tmdb_id)));
        }
        if status == 429 {
            return Err(MetadataError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let movie: TmdbMovieDetails = response.json().await.map_err(|e| {
            MetadataError::ParseError(format!("Failed to parse movie response: {}", e))
        })?;

        Ok(movie.into())
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError> {
        let started = Instant::now();
        let result = self.search_movies(query).await;
        record_external("tmdb", "search", started, &result);
        result
    }

    async fn get_details(&self, id: &str) -> Result<MovieRecord, MetadataError> {
        let started = Instant::now();
        let result = self.get_movie(id).await;
        record_external("tmdb", "details", started, &result);
        result
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    results: Vec<TmdbMovieResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    overview: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
    #[serde(default)]
    credits: Option<TmdbCredits>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
    #[serde(default)]
    crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCastMember {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCrewMember {
    name: String,
    #[serde(default)]
    job: String,
}

// ============================================================================
// Conversions
// ============================================================================

fn poster_url(path: Option<String>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", IMAGE_BASE_URL, p))
}

impl From<TmdbMovieResult> for MovieSearchHit {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id.to_string(),
            title: r.title,
            year: r.release_date.as_deref().and_then(year_from_date),
            description: r.overview.filter(|o| !o.is_empty()),
            poster: poster_url(r.poster_path),
        }
    }
}

impl From<TmdbMovieDetails> for MovieRecord {
    fn from(d: TmdbMovieDetails) -> Self {
        let credits = d.credits.unwrap_or_default();
        let directors: Vec<String> = credits
            .crew
            .into_iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name)
            .collect();

        Self {
            external_id: d.id.to_string(),
            title: d.title,
            original_title: d.original_title,
            year: d.release_date.as_deref().and_then(year_from_date),
            rating: d.vote_average,
            director: if directors.is_empty() {
                None
            } else {
                Some(directors.join(", "))
            },
            cast: credits
                .cast
                .into_iter()
                .take(TOP_CAST)
                .map(|c| c.name)
                .collect(),
            genres: d.genres.into_iter().map(|g| g.name).collect(),
            runtime_minutes: d.runtime,
            plot: d.overview,
            poster: poster_url(d.poster_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = TmdbConfig {
            api_key: String::new(),
            base_url: None,
        };
        assert!(matches!(
            TmdbClient::new(&config),
            Err(MetadataError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_movie_result_conversion() {
        let result = TmdbMovieResult {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-30".to_string()),
            overview: Some("A computer hacker...".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
        };

        let hit: MovieSearchHit = result.into();
        assert_eq!(hit.id, "603");
        assert_eq!(hit.year, Some(1999));
        assert_eq!(
            hit.poster.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
    }

    #[test]
    fn test_movie_details_conversion_with_credits() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "original_title": "The Matrix",
            "release_date": "1999-03-30",
            "runtime": 136,
            "overview": "A computer hacker...",
            "poster_path": null,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "vote_average": 8.2,
            "credits": {
                "cast": [
                    {"name": "Keanu Reeves"}, {"name": "Laurence Fishburne"},
                    {"name": "Carrie-Anne Moss"}, {"name": "Hugo Weaving"},
                    {"name": "Joe Pantoliano"}, {"name": "Marcus Chong"}
                ],
                "crew": [
                    {"name": "Lana Wachowski", "job": "Director"},
                    {"name": "Bill Pope", "job": "Director of Photography"},
                    {"name": "Lilly Wachowski", "job": "Director"}
                ]
            }
        }"#;

        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let movie: MovieRecord = details.into();
        assert_eq!(movie.external_id, "603");
        assert_eq!(movie.runtime_minutes, Some(136));
        assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(
            movie.director.as_deref(),
            Some("Lana Wachowski, Lilly Wachowski")
        );
        assert_eq!(movie.cast.len(), 5);
        assert!(movie.poster.is_none());
    }

    #[test]
    fn test_movie_details_without_credits() {
        let json = r#"{"id": 1, "title": "X", "original_title": null, "release_date": null,
            "runtime": null, "overview": null, "poster_path": null, "vote_average": null}"#;
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let movie: MovieRecord = details.into();
        assert!(movie.director.is_none());
        assert!(movie.cast.is_empty());
        assert!(movie.year.is_none());
    }
}
