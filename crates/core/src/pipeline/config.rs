//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for subtitle acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Subtitle languages in order of preference.
    #[serde(default = "default_languages")]
    pub preferred_languages: Vec<String>,

    /// Locale English subtitles are translated into when English is not preferred.
    #[serde(default = "default_translation_target")]
    pub translation_target: String,

    /// Where subtitles requested through the API are saved.
    /// Watched directories always receive their subtitle next to the movie.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

fn default_languages() -> Vec<String> {
    vec!["zh-CN".to_string(), "zh".to_string(), "en".to_string()]
}

fn default_translation_target() -> String {
    "zh-CN".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preferred_languages: default_languages(),
            translation_target: default_translation_target(),
            download_dir: default_download_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.preferred_languages, vec!["zh-CN", "zh", "en"]);
        assert_eq!(config.translation_target, "zh-CN");
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_partial_override() {
        let config: PipelineConfig = toml::from_str(r#"preferred_languages = ["en"]"#).unwrap();
        assert_eq!(config.preferred_languages, vec!["en"]);
        assert_eq!(config.translation_target, "zh-CN");
    }
}
