//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external service trait,
//! so the pipeline, the monitor and the HTTP API can be exercised without
//! network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use subscout_core::testing::{fixtures, MockMovieCatalog, MockSubtitleService};
//!
//! let catalog = MockMovieCatalog::new();
//! catalog.add_movie(fixtures::movie_record("27205", "Inception")).await;
//!
//! let subtitles = MockSubtitleService::new();
//! subtitles
//!     .set_id_results("27205", "en", vec![fixtures::subtitle_record(1, "en")])
//!     .await;
//! ```

mod clock;
mod mock_catalog;
mod mock_llm;
mod mock_processor;
mod mock_subtitles;

pub use clock::ManualClock;
pub use mock_catalog::{MockMovieCatalog, RecordedCatalogQuery};
pub use mock_llm::MockLlmClient;
pub use mock_processor::MockDirectoryProcessor;
pub use mock_subtitles::{MockSubtitleService, RecordedSubtitleQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::{MovieRecord, MovieSearchHit};
    use crate::subtitles::SubtitleRecord;

    /// Create a catalog search hit.
    pub fn search_hit(id: &str, title: &str) -> MovieSearchHit {
        MovieSearchHit {
            id: id.to_string(),
            title: title.to_string(),
            year: None,
            description: None,
            poster: None,
        }
    }

    /// Create a movie record with reasonable defaults and no year.
    pub fn movie_record(id: &str, title: &str) -> MovieRecord {
        MovieRecord {
            external_id: id.to_string(),
            title: title.to_string(),
            original_title: None,
            year: None,
            rating: Some(7.5),
            director: Some("Jane Doe".to_string()),
            cast: vec!["Actor One".to_string(), "Actor Two".to_string()],
            genres: vec!["Drama".to_string()],
            runtime_minutes: Some(120),
            plot: Some(format!("A movie about {}.", title.to_lowercase())),
            poster: None,
        }
    }

    /// Create a plain `.srt` subtitle: 100 downloads, rating 4.0, no flags set.
    pub fn subtitle_record(id: u64, language: &str) -> SubtitleRecord {
        SubtitleRecord {
            id,
            file_name: format!("subtitle-{}.srt", id),
            language: language.to_string(),
            download_count: 100,
            rating: 4.0,
            release: None,
            size: Some(40_000),
            upload_date: None,
            hd: false,
            fps: None,
            comments: None,
            ai_translated: false,
            machine_translated: false,
        }
    }
}
