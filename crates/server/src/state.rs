use std::path::Path;
use std::sync::Arc;

use subscout_core::{
    Config, DirectoryLockSet, DirectoryMonitor, DirectoryProcessor, DownloadManager,
    MovieCatalog, SanitizedConfig, SubtitleResolver, TranslationFallback,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn MovieCatalog>,
    subtitles: Arc<SubtitleResolver>,
    downloads: Arc<DownloadManager>,
    translation: TranslationFallback,
    processor: Arc<dyn DirectoryProcessor>,
    monitor: Option<Arc<DirectoryMonitor>>,
    locks: Option<DirectoryLockSet>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn MovieCatalog>,
        subtitles: Arc<SubtitleResolver>,
        downloads: Arc<DownloadManager>,
        translation: TranslationFallback,
        processor: Arc<dyn DirectoryProcessor>,
        monitor: Option<Arc<DirectoryMonitor>>,
    ) -> Self {
        Self {
            config,
            catalog,
            subtitles,
            downloads,
            translation,
            processor,
            monitor,
            locks: None,
        }
    }

    /// Expose the pipeline's directory locks for metrics.
    pub fn with_locks(mut self, locks: DirectoryLockSet) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog(&self) -> &dyn MovieCatalog {
        self.catalog.as_ref()
    }

    pub fn subtitles(&self) -> &SubtitleResolver {
        &self.subtitles
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.downloads
    }

    pub fn translation(&self) -> &TranslationFallback {
        &self.translation
    }

    pub fn processor(&self) -> &dyn DirectoryProcessor {
        self.processor.as_ref()
    }

    pub fn monitor(&self) -> Option<&DirectoryMonitor> {
        self.monitor.as_deref()
    }

    pub fn locks(&self) -> Option<&DirectoryLockSet> {
        self.locks.as_ref()
    }

    /// Where subtitles requested through the API are written.
    pub fn download_dir(&self) -> &Path {
        &self.config.pipeline.download_dir
    }
}
