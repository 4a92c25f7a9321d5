//! Types for movie metadata.

use serde::{Deserialize, Serialize};

/// One entry of a catalog search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSearchHit {
    /// Catalog id (TMDB numeric id or IMDB `tt` id).
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absolute poster URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Full movie record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// Catalog id, also used for subtitle id search.
    pub external_id: String,
    /// Movie title.
    pub title: String,
    /// Original title (in original language).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Release year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Average rating (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Director name(s), comma separated when several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    /// Leading cast members.
    #[serde(default)]
    pub cast: Vec<String>,
    /// Genre names.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Runtime in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    /// Plot synopsis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    /// Absolute poster URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Parse the leading year of a `YYYY-MM-DD` (or `YYYY`) date.
pub(crate) fn year_from_date(date: &str) -> Option<u32> {
    date.split('-').next().and_then(|y| y.trim().parse().ok())
}

/// Split a comma separated list ("Action, Sci-Fi") into trimmed names.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_date() {
        assert_eq!(year_from_date("1999-03-30"), Some(1999));
        assert_eq!(year_from_date("2010"), Some(2010));
        assert_eq!(year_from_date(""), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("Action, Sci-Fi ,"), vec!["Action", "Sci-Fi"]);
        assert!(split_list("").is_empty());
    }
}
