use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::state::DirectoryLockSet;
use super::types::{PipelineError, PipelineOutcome};
use crate::media::{file_stem, scan_directory, select_candidate};
use crate::metadata::TitleResolver;
use crate::metrics::{PIPELINE_DURATION, PIPELINE_RUNS};
use crate::subtitles::{select_best, DownloadManager, DownloadOutcome, SubtitleResolver};
use crate::translate::TranslationFallback;

/// Something that can process a movie directory.
#[async_trait]
pub trait DirectoryProcessor: Send + Sync {
    async fn process_directory(&self, dir: &Path) -> Result<PipelineOutcome, PipelineError>;
}

/// The full acquisition chain for one directory, at most one run per directory at a time.
pub struct DirectoryPipeline {
    locks: DirectoryLockSet,
    titles: TitleResolver,
    subtitles: Arc<SubtitleResolver>,
    downloads: Arc<DownloadManager>,
    translation: TranslationFallback,
}

impl DirectoryPipeline {
    pub fn new(
        titles: TitleResolver,
        subtitles: Arc<SubtitleResolver>,
        downloads: Arc<DownloadManager>,
        translation: TranslationFallback,
    ) -> Self {
        Self {
            locks: DirectoryLockSet::new(),
            titles,
            subtitles,
            downloads,
            translation,
        }
    }

    /// Directories currently being processed.
    pub fn locks(&self) -> &DirectoryLockSet {
        &self.locks
    }

    async fn run(&self, dir: &Path) -> Result<PipelineOutcome, PipelineError> {
        let files = scan_directory(dir).await?;
        let Some(candidate) = select_candidate(&files) else {
            warn!(dir = %dir.display(), "No movie file found");
            return Ok(PipelineOutcome::NoCandidate);
        };
        info!(
            file = %candidate.path.display(),
            size = candidate.size_bytes,
            "Selected movie file"
        );

        let Some(resolved) = self.titles.resolve(&candidate.path).await? else {
            warn!(file = %candidate.path.display(), "No movie metadata found");
            return Ok(PipelineOutcome::NoMetadata {
                candidate: candidate.path.clone(),
            });
        };
        let movie = resolved.record;

        let found = self.subtitles.resolve(&movie).await?;
        let Some(best) = select_best(&found, self.subtitles.primary_language()) else {
            warn!(movie = %movie.title, "No subtitles found");
            return Ok(PipelineOutcome::NoSubtitles {
                movie_title: movie.title,
            });
        };
        info!(
            movie = %movie.title,
            file_id = best.id,
            language = %best.language,
            downloads = best.download_count,
            "Selected subtitle"
        );

        let movie_name = file_stem(&candidate.path);
        let fallback_name = format!(
            "{}{}",
            movie_name,
            best.extension().unwrap_or_else(|| ".srt".to_string())
        );

        let subtitle_path = match self
            .downloads
            .download_if_missing(best, dir, &movie_name, &fallback_name)
            .await?
        {
            DownloadOutcome::AlreadyPresent(existing) => {
                return Ok(PipelineOutcome::AlreadyPresent { existing });
            }
            DownloadOutcome::Downloaded(path) => path,
        };

        // Translation failures are logged by the fallback and leave the download in place.
        let translated_path = self
            .translation
            .apply(best, &subtitle_path)
            .await
            .ok()
            .flatten();

        Ok(PipelineOutcome::Downloaded {
            movie_title: movie.title,
            subtitle_path,
            translated_path,
        })
    }
}

#[async_trait]
impl DirectoryProcessor for DirectoryPipeline {
    async fn process_directory(&self, dir: &Path) -> Result<PipelineOutcome, PipelineError> {
        let Some(_lease) = self.locks.try_acquire(dir) else {
            info!(dir = %dir.display(), "Directory already being processed, skipping");
            PIPELINE_RUNS.with_label_values(&["busy"]).inc();
            return Ok(PipelineOutcome::Busy);
        };

        info!(dir = %dir.display(), "Processing directory");
        let started = Instant::now();
        let result = self.run(dir).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "failed",
        };
        PIPELINE_RUNS.with_label_values(&[label]).inc();
        PIPELINE_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(_) => info!(dir = %dir.display(), outcome = label, "Directory processed"),
            Err(e) => error!(dir = %dir.display(), error = %e, "Directory processing failed"),
        }
        result
    }
}
