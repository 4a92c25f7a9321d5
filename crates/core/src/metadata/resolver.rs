use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{MetadataError, MovieCatalog, MovieRecord, MovieSearchHit};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::media::file_stem;

const SIMPLIFY_SYSTEM_PROMPT: &str = "You clean up movie file names. Remove the year, \
resolution, codec, audio format, subtitle markers, release group and any other noise, \
keeping only the movie's title. Reply with the title alone, without quotes or explanation.";

const SIMPLIFY_MAX_TOKENS: u32 = 100;
const SIMPLIFY_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum TitleError {
    #[error("metadata lookup failed: {0}")]
    Metadata(#[from] MetadataError),

    #[error("title simplification failed: {0}")]
    Llm(#[from] LlmError),
}

/// A movie identified from a file name.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMovie {
    /// The title that found the movie: the raw file stem or its simplified form.
    pub working_title: String,
    pub record: MovieRecord,
}

/// Turns a video file name into a catalog record.
pub struct TitleResolver {
    catalog: Arc<dyn MovieCatalog>,
    llm: Arc<dyn LlmClient>,
}

impl TitleResolver {
    pub fn new(catalog: Arc<dyn MovieCatalog>, llm: Arc<dyn LlmClient>) -> Self {
        Self { catalog, llm }
    }

    /// Identify the movie behind `candidate`.
    ///
    /// The raw file stem is searched verbatim first. When that finds nothing
    /// (or the search fails) the LLM simplifies the name and the simplified
    /// title is searched instead. `Ok(None)` means no catalog entry matched.
    pub async fn resolve(&self, candidate: &Path) -> Result<Option<ResolvedMovie>, TitleError> {
        let raw_name = file_stem(candidate);

        let raw_hits = match self.catalog.search(&raw_name).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = %raw_name, error = %e, "Raw name search failed, trying simplified title");
                Vec::new()
            }
        };

        let (working_title, hits) = if raw_hits.is_empty() {
            let simplified = self.simplify(&raw_name).await?;
            if simplified.is_empty() {
                warn!(raw = %raw_name, "LLM returned an empty title");
                return Ok(None);
            }
            info!(raw = %raw_name, simplified = %simplified, "Simplified movie name");
            let hits = self.catalog.search(&simplified).await?;
            (simplified, hits)
        } else {
            (raw_name, raw_hits)
        };

        let Some(first) = hits.into_iter().next() else {
            info!(title = %working_title, "No metadata match");
            return Ok(None);
        };

        let record = self.details(&first).await?;
        debug!(
            title = %record.title,
            id = %record.external_id,
            "Resolved movie metadata"
        );

        Ok(Some(ResolvedMovie {
            working_title,
            record,
        }))
    }

    async fn details(&self, hit: &MovieSearchHit) -> Result<MovieRecord, MetadataError> {
        self.catalog.get_details(&hit.id).await
    }

    /// Ask the LLM for the bare movie title hidden in a release name.
    pub async fn simplify(&self, raw_name: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(format!("File name: {}", raw_name))
            .with_system(SIMPLIFY_SYSTEM_PROMPT)
            .with_max_tokens(SIMPLIFY_MAX_TOKENS)
            .with_temperature(SIMPLIFY_TEMPERATURE);

        let response = self.llm.complete(request).await?;
        Ok(clean_completion(&response.text))
    }
}

fn clean_completion(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
