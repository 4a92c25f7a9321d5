use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::llm::{LlmConfig, LlmProvider};
use crate::pipeline::PipelineConfig;
use crate::watcher::WatcherConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub metadata: MetadataConfig,
    pub opensubtitles: OpenSubtitlesConfig,
    pub llm: LlmConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3001
}

/// Movie metadata configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Metadata backend type
    pub backend: MetadataBackend,
    /// TMDB configuration (required when backend = "tmdb")
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    /// imdb-api.com configuration (required when backend = "imdb")
    #[serde(default)]
    pub imdb: Option<ImdbConfig>,
}

/// Available metadata backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetadataBackend {
    Tmdb,
    Imdb,
}

impl MetadataBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataBackend::Tmdb => "tmdb",
            MetadataBackend::Imdb => "imdb",
        }
    }
}

/// TMDB API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (v3 auth).
    pub api_key: String,
    /// Base URL override (mostly for tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

/// imdb-api.com configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdbConfig {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// OpenSubtitles REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenSubtitlesConfig {
    /// Consumer API key sent as the `Api-Key` header
    pub api_key: String,
    /// Account used for the download token exchange
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// User-Agent header override
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Base URL override (default: https://api.opensubtitles.com/api/v1)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Search/login/link request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Subtitle file fetch timeout in seconds (default: 20)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

fn default_download_timeout() -> u32 {
    20
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub watcher: WatcherConfig,
    pub pipeline: PipelineConfig,
    pub metadata: SanitizedMetadataConfig,
    pub opensubtitles: SanitizedOpenSubtitlesConfig,
    pub llm: SanitizedLlmConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMetadataConfig {
    pub backend: String,
    pub api_key_configured: bool,
}

/// Sanitized OpenSubtitles config (key and password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOpenSubtitlesConfig {
    pub api_key_configured: bool,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
    pub download_timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let metadata_key = match config.metadata.backend {
            MetadataBackend::Tmdb => config.metadata.tmdb.as_ref().map(|c| &c.api_key),
            MetadataBackend::Imdb => config.metadata.imdb.as_ref().map(|c| &c.api_key),
        };

        Self {
            server: config.server.clone(),
            watcher: config.watcher.clone(),
            pipeline: config.pipeline.clone(),
            metadata: SanitizedMetadataConfig {
                backend: config.metadata.backend.as_str().to_string(),
                api_key_configured: metadata_key.is_some_and(|k| !k.is_empty()),
            },
            opensubtitles: SanitizedOpenSubtitlesConfig {
                api_key_configured: !config.opensubtitles.api_key.is_empty(),
                username: config.opensubtitles.username.clone(),
                password_configured: !config.opensubtitles.password.is_empty(),
                timeout_secs: config.opensubtitles.timeout_secs,
                download_timeout_secs: config.opensubtitles.download_timeout_secs,
            },
            llm: SanitizedLlmConfig {
                provider: match config.llm.provider {
                    LlmProvider::OpenAi => "open_ai".to_string(),
                    LlmProvider::Anthropic => "anthropic".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                model: config.llm.model.clone(),
                api_key_configured: config.llm.api_key.as_ref().is_some_and(|k| !k.is_empty()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &str = r#"
[metadata]
backend = "imdb"

[metadata.imdb]
api_key = "imdb-key"

[opensubtitles]
api_key = "os-key"
username = "alice"
password = "hunter2"

[llm]
provider = "anthropic"
model = "claude-3-haiku-20240307"
api_key = "sk-ant"
"#;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str(REQUIRED).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(!config.watcher.enabled);
        assert_eq!(config.watcher.depth, 1);
        assert_eq!(config.watcher.stability_window_ms, 2000);
        assert_eq!(config.watcher.poll_interval_ms, 100);
        assert_eq!(config.watcher.process_delay_ms, 3000);
        assert_eq!(
            config.pipeline.preferred_languages,
            vec!["zh-CN".to_string(), "zh".to_string(), "en".to_string()]
        );
        assert_eq!(config.pipeline.translation_target, "zh-CN");
        assert_eq!(config.opensubtitles.timeout_secs, 30);
        assert_eq!(config.opensubtitles.download_timeout_secs, 20);
        assert_eq!(config.metadata.backend, MetadataBackend::Imdb);
    }

    #[test]
    fn test_deserialize_missing_llm_fails() {
        let toml = r#"
[metadata]
backend = "tmdb"

[opensubtitles]
api_key = "k"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let config: Config = toml::from_str(REQUIRED).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.metadata.backend, "imdb");
        assert!(sanitized.metadata.api_key_configured);
        assert!(sanitized.opensubtitles.password_configured);
        assert_eq!(sanitized.llm.provider, "anthropic");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("os-key"));
        assert!(!json.contains("sk-ant"));
    }
}
