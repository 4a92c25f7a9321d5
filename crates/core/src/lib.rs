pub mod config;
pub mod llm;
pub mod media;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod subtitles;
pub mod testing;
pub mod translate;
pub mod watcher;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ImdbConfig,
    MetadataBackend, MetadataConfig, OpenSubtitlesConfig, SanitizedConfig, ServerConfig,
    TmdbConfig,
};
pub use llm::{
    create_llm_client, AnthropicClient, CompletionRequest, CompletionResponse, LlmClient,
    LlmConfig, LlmError, LlmProvider, OllamaClient, OpenAiClient,
};
pub use media::{scan_directory, select_candidate, MovieCandidateFile};
pub use metadata::{
    create_catalog, ImdbClient, MetadataError, MovieCatalog, MovieRecord, MovieSearchHit,
    ResolvedMovie, TitleError, TitleResolver, TmdbClient,
};
pub use pipeline::{
    DirectoryLockSet, DirectoryPipeline, DirectoryProcessor, PipelineConfig, PipelineError,
    PipelineOutcome, ProcessedFileRegistry,
};
pub use subtitles::{
    list_download_history, select_best, Credentials, DownloadManager, DownloadOutcome,
    DownloadedFile, OpenSubtitlesClient, SubtitleDownloader, SubtitleError, SubtitleRecord,
    SubtitleResolver, SubtitleSearch,
};
pub use translate::{TranslationError, TranslationFallback};
pub use watcher::{DirectoryMonitor, WatchEvent, WatcherConfig, WatcherError, WatcherStatus};
