//! imdb-api.com client.
//!
//! The API key is part of the URL path and errors come back as
//! `200 OK` with a non-empty `errorMessage` field.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{split_list, year_from_date, MovieRecord, MovieSearchHit};
use super::{MetadataError, MovieCatalog};
use crate::config::ImdbConfig;
use crate::metrics::record_external;

const DEFAULT_BASE_URL: &str = "https://imdb-api.com/API";

/// imdb-api.com client.
pub struct ImdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ImdbClient {
    pub fn new(config: &ImdbConfig) -> Result<Self, MetadataError> {
        if config.api_key.is_empty() {
            return Err(MetadataError::NotConfigured(
                "IMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, MetadataError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(MetadataError::NotConfigured(
                "Invalid IMDB API key".to_string(),
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

        response
            .json()
            .await
            .map_err(|e| MetadataError::ParseError(format!("Failed to parse IMDB response: {}", e)))
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError> {
        debug!("IMDB movie search: query='{}'", query);

        let url = format!(
            "{}/SearchMovie/{}/{}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        );
        let body: ImdbSearchResponse = self.get_json(&url).await?;
        check_error_message(body.error_message)?;

        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.into())
            .collect())
    }

    async fn get_title(&self, id: &str) -> Result<MovieRecord, MetadataError> {
        debug!("IMDB get title: id={}", id);

        let url = format!(
            "{}/Title/{}/{}",
            self.base_url,
            self.api_key,
            urlencoding::encode(id)
        );
        let body: ImdbTitleResponse = self.get_json(&url).await?;
        check_error_message(body.error_message.clone())?;

        if body.id.as_deref().unwrap_or_default().is_empty() {
            return Err(MetadataError::NotFound(format!("IMDB title {}", id)));
        }

        Ok(body.into())
    }
}

fn check_error_message(message: Option<String>) -> Result<(), MetadataError> {
    match message {
        Some(m) if !m.is_empty() => Err(MetadataError::ApiError {
            status: 200,
            message: m,
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl MovieCatalog for ImdbClient {
    fn name(&self) -> &str {
        "imdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSearchHit>, MetadataError> {
        let started = Instant::now();
        let result = self.search_movies(query).await;
        record_external("imdb", "search", started, &result);
        result
    }

    async fn get_details(&self, id: &str) -> Result<MovieRecord, MetadataError> {
        let started = Instant::now();
        let result = self.get_title(id).await;
        record_external("imdb", "details", started, &result);
        result
    }
}

// ============================================================================
// imdb-api.com Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImdbSearchResponse {
    results: Option<Vec<ImdbSearchResult>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImdbSearchResult {
    id: String,
    title: String,
    description: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImdbTitleResponse {
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    original_title: Option<String>,
    year: Option<String>,
    plot: Option<String>,
    image: Option<String>,
    #[serde(rename = "imDbRating")]
    imdb_rating: Option<String>,
    directors: Option<String>,
    stars: Option<String>,
    genres: Option<String>,
    runtime_mins: Option<String>,
    error_message: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ImdbSearchResult> for MovieSearchHit {
    fn from(r: ImdbSearchResult) -> Self {
        // description looks like "(1999)" or "(1999) aka Matrix"
        let year = r.description.as_deref().and_then(|d| {
            let digits: String = d
                .trim_start_matches('(')
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        });

        Self {
            id: r.id,
            title: r.title,
            year,
            description: non_empty(r.description),
            poster: non_empty(r.image),
        }
    }
}

impl From<ImdbTitleResponse> for MovieRecord {
    fn from(r: ImdbTitleResponse) -> Self {
        Self {
            external_id: r.id.unwrap_or_default(),
            title: r.title.unwrap_or_default(),
            original_title: non_empty(r.original_title),
            year: r.year.as_deref().and_then(year_from_date),
            rating: r.imdb_rating.and_then(|v| v.trim().parse().ok()),
            director: non_empty(r.directors),
            cast: r.stars.as_deref().map(split_list).unwrap_or_default(),
            genres: r.genres.as_deref().map(split_list).unwrap_or_default(),
            runtime_minutes: r.runtime_mins.and_then(|v| v.trim().parse().ok()),
            plot: non_empty(r.plot),
            poster: non_empty(r.image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = ImdbConfig {
            api_key: String::new(),
            base_url: None,
        };
        assert!(ImdbClient::new(&config).is_err());
    }

    #[test]
    fn test_search_result_conversion() {
        let json = r#"{
            "searchType": "Movie",
            "expression": "inception",
            "results": [
                {"id": "tt1375666", "resultType": "Title", "image": "https://img/x.jpg",
                 "title": "Inception", "description": "(2010)"}
            ],
            "errorMessage": ""
        }"#;
        let body: ImdbSearchResponse = serde_json::from_str(json).unwrap();
        assert!(check_error_message(body.error_message).is_ok());

        let hit: MovieSearchHit = body.results.unwrap().remove(0).into();
        assert_eq!(hit.id, "tt1375666");
        assert_eq!(hit.year, Some(2010));
        assert_eq!(hit.poster.as_deref(), Some("https://img/x.jpg"));
    }

    #[test]
    fn test_error_message_is_an_error() {
        let json = r#"{"results": null, "errorMessage": "Invalid API Key"}"#;
        let body: ImdbSearchResponse = serde_json::from_str(json).unwrap();
        let err = check_error_message(body.error_message).unwrap_err();
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn test_title_conversion() {
        let json = r#"{
            "id": "tt0133093",
            "title": "The Matrix",
            "originalTitle": "",
            "year": "1999",
            "plot": "Neo learns the truth.",
            "image": "https://img/matrix.jpg",
            "imDbRating": "8.7",
            "directors": "Lana Wachowski, Lilly Wachowski",
            "stars": "Keanu Reeves, Laurence Fishburne, Carrie-Anne Moss",
            "genres": "Action, Sci-Fi",
            "runtimeMins": "136",
            "errorMessage": null
        }"#;
        let body: ImdbTitleResponse = serde_json::from_str(json).unwrap();
        let movie: MovieRecord = body.into();
        assert_eq!(movie.external_id, "tt0133093");
        assert_eq!(movie.year, Some(1999));
        assert_eq!(movie.rating, Some(8.7));
        assert!(movie.original_title.is_none());
        assert_eq!(movie.cast.len(), 3);
        assert_eq!(movie.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(movie.runtime_minutes, Some(136));
    }
}
