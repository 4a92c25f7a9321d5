use std::sync::Arc;

use tracing::{info, warn};

use super::{SubtitleError, SubtitleRecord, SubtitleSearch};
use crate::metadata::MovieRecord;

/// Finds subtitles for a movie, walking the preferred languages in order.
pub struct SubtitleResolver {
    search: Arc<dyn SubtitleSearch>,
    preferred_languages: Vec<String>,
}

impl SubtitleResolver {
    pub fn new(search: Arc<dyn SubtitleSearch>, preferred_languages: Vec<String>) -> Self {
        Self {
            search,
            preferred_languages,
        }
    }

    /// First preferred language, used for the title fallback.
    pub fn primary_language(&self) -> &str {
        self.preferred_languages
            .first()
            .map(String::as_str)
            .unwrap_or("en")
    }

    /// Subtitles for `movie`.
    ///
    /// Each preferred language gets an id search; the first language with
    /// results wins and later languages are never queried. A failed id
    /// search is logged and the next language tried. When every language
    /// comes back empty a single title+year search runs in the primary
    /// language. An empty result is not an error.
    pub async fn resolve(&self, movie: &MovieRecord) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        for language in &self.preferred_languages {
            match self.search.search_by_id(&movie.external_id, language).await {
                Ok(found) if !found.is_empty() => {
                    info!(
                        movie = %movie.title,
                        language = %language,
                        count = found.len(),
                        "Found subtitles by id"
                    );
                    return Ok(found);
                }
                Ok(_) => {
                    info!(movie = %movie.title, language = %language, "No subtitles by id");
                }
                Err(e) => {
                    warn!(
                        movie = %movie.title,
                        language = %language,
                        error = %e,
                        "Subtitle id search failed, trying next language"
                    );
                }
            }
        }

        let language = self.primary_language();
        info!(movie = %movie.title, year = ?movie.year, language, "Falling back to title search");
        let found = self
            .search
            .search_by_title(&movie.title, movie.year, language)
            .await?;

        if found.is_empty() {
            warn!(movie = %movie.title, "No subtitles found");
        }
        Ok(found)
    }

    /// Interactive lookup in one language: id first, then title.
    pub async fn search_direct(
        &self,
        external_id: Option<&str>,
        title: Option<&str>,
        year: Option<u32>,
        language: &str,
    ) -> Result<Vec<SubtitleRecord>, SubtitleError> {
        if let Some(id) = external_id.filter(|id| !id.is_empty()) {
            let found = self.search.search_by_id(id, language).await?;
            if !found.is_empty() {
                return Ok(found);
            }
            info!(external_id = id, language, "No subtitles by id, trying title");
        }

        match title.filter(|t| !t.is_empty()) {
            Some(title) => self.search.search_by_title(title, year, language).await,
            None => {
                warn!("Subtitle search without id or title");
                Ok(Vec::new())
            }
        }
    }
}
