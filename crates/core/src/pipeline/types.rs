//! Types for directory pipeline runs.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::metadata::TitleError;
use crate::subtitles::SubtitleError;

/// Errors that abort a directory run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Listing the directory failed.
    #[error("failed to read directory: {0}")]
    Io(#[from] std::io::Error),

    /// Title or metadata resolution failed.
    #[error("title resolution failed: {0}")]
    Title(#[from] TitleError),

    /// Subtitle search or download failed.
    #[error("subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

/// How a directory run ended. Everything but `Downloaded` means nothing was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Another run holds this directory.
    Busy,
    /// No non-sample video file in the directory.
    NoCandidate,
    /// The catalog has no match for the video.
    NoMetadata { candidate: PathBuf },
    /// No subtitles in any language.
    NoSubtitles { movie_title: String },
    /// A matching subtitle already sits next to the video.
    AlreadyPresent { existing: PathBuf },
    Downloaded {
        movie_title: String,
        subtitle_path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        translated_path: Option<PathBuf>,
    },
}

impl PipelineOutcome {
    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Busy => "busy",
            PipelineOutcome::NoCandidate => "no_candidate",
            PipelineOutcome::NoMetadata { .. } => "no_metadata",
            PipelineOutcome::NoSubtitles { .. } => "no_subtitles",
            PipelineOutcome::AlreadyPresent { .. } => "already_present",
            PipelineOutcome::Downloaded { .. } => "downloaded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = PipelineOutcome::Downloaded {
            movie_title: "Inception".to_string(),
            subtitle_path: PathBuf::from("/m/Inception.srt"),
            translated_path: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "downloaded");
        assert_eq!(json["movie_title"], "Inception");
        assert!(json.get("translated_path").is_none());

        let json = serde_json::to_value(PipelineOutcome::Busy).unwrap();
        assert_eq!(json["outcome"], "busy");
        assert_eq!(PipelineOutcome::NoCandidate.label(), "no_candidate");
    }
}
