//! LLM translation of downloaded subtitles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::metrics::TRANSLATIONS;
use crate::subtitles::SubtitleRecord;

const TRANSLATE_MAX_TOKENS: u32 = 2000;
const TRANSLATE_TEMPERATURE: f32 = 0.3;

/// The language that triggers translation when it is not wanted.
const SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation came back empty")]
    Empty,
}

/// Translates English subtitles when English is not a wanted language.
pub struct TranslationFallback {
    llm: Arc<dyn LlmClient>,
    preferred_languages: Vec<String>,
    target_language: String,
}

impl TranslationFallback {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        preferred_languages: Vec<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            preferred_languages,
            target_language: target_language.into(),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Only English subtitles are translated, and only if English was not asked for.
    pub fn should_translate(&self, language: &str) -> bool {
        language == SOURCE_LANGUAGE
            && !self.preferred_languages.iter().any(|l| l == SOURCE_LANGUAGE)
    }

    /// Translate subtitle text, keeping cue numbers and timestamps intact.
    pub async fn translate_text(
        &self,
        content: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let request = CompletionRequest::new(format!(
            "Translate the following subtitles into {target_language}. Keep the numbering, \
timestamps and layout exactly as they are and translate only the dialogue text. \
Reply with the translated subtitles only.\n\n{content}"
        ))
        .with_max_tokens(TRANSLATE_MAX_TOKENS)
        .with_temperature(TRANSLATE_TEMPERATURE);

        let response = self.llm.complete(request).await?;
        let text = response.text.trim();
        if text.is_empty() {
            return Err(TranslationError::Empty);
        }
        Ok(text.to_string())
    }

    /// Translate the file at `path` if `subtitle` calls for it.
    ///
    /// The translation is written next to the original (`Movie.srt` becomes
    /// `Movie.zh-CN.srt`); the original is left untouched. Returns the new
    /// path, or `None` when no translation was needed.
    pub async fn apply(
        &self,
        subtitle: &SubtitleRecord,
        path: &Path,
    ) -> Result<Option<PathBuf>, TranslationError> {
        if !self.should_translate(&subtitle.language) {
            return Ok(None);
        }

        info!(
            path = %path.display(),
            target = %self.target_language,
            "Translating subtitle"
        );

        let result = self.translate_file(path).await;
        match &result {
            Ok(out) => {
                TRANSLATIONS.with_label_values(&["success"]).inc();
                info!(path = %out.display(), "Subtitle translated");
            }
            Err(e) => {
                TRANSLATIONS.with_label_values(&["failed"]).inc();
                warn!(path = %path.display(), error = %e, "Subtitle translation failed");
            }
        }
        result.map(Some)
    }

    async fn translate_file(&self, path: &Path) -> Result<PathBuf, TranslationError> {
        let bytes = tokio::fs::read(path).await?;
        let content = String::from_utf8_lossy(&bytes);
        let translated = self.translate_text(&content, &self.target_language).await?;

        let out = translated_path(path, &self.target_language);
        tokio::fs::write(&out, translated.as_bytes()).await?;
        Ok(out)
    }
}

/// `Movie.srt` + `zh-CN` -> `Movie.zh-CN.srt`.
pub fn translated_path(path: &Path, language: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.{}.{}", stem, language, ext.to_string_lossy()),
        None => format!("{}.{}", stem, language),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockLlmClient};
    use tempfile::TempDir;

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_should_translate() {
        let llm = Arc::new(MockLlmClient::new());
        let fallback = TranslationFallback::new(llm.clone(), langs(&["zh-CN", "zh"]), "zh-CN");
        assert!(fallback.should_translate("en"));
        assert!(!fallback.should_translate("zh"));
        assert!(!fallback.should_translate("fr"));

        let fallback = TranslationFallback::new(llm, langs(&["zh-CN", "en"]), "zh-CN");
        assert!(!fallback.should_translate("en"));
    }

    #[test]
    fn test_translated_path() {
        assert_eq!(
            translated_path(Path::new("/m/Movie.srt"), "zh-CN"),
            PathBuf::from("/m/Movie.zh-CN.srt")
        );
        assert_eq!(
            translated_path(Path::new("/m/Movie.2010.ass"), "zh-CN"),
            PathBuf::from("/m/Movie.2010.zh-CN.ass")
        );
        assert_eq!(
            translated_path(Path::new("/m/Movie"), "fr"),
            PathBuf::from("/m/Movie.fr")
        );
    }

    #[tokio::test]
    async fn test_apply_writes_sibling() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("Movie.srt");
        std::fs::write(&original, "1\n00:00:01,000 --> 00:00:02,000\nHello\n").unwrap();

        let llm = Arc::new(MockLlmClient::new());
        llm.push_response("1\n00:00:01,000 --> 00:00:02,000\n你好\n").await;
        let fallback = TranslationFallback::new(llm.clone(), langs(&["zh-CN", "zh"]), "zh-CN");

        let out = fallback
            .apply(&fixtures::subtitle_record(1, "en"), &original)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out, dir.path().join("Movie.zh-CN.srt"));
        assert!(std::fs::read_to_string(&out).unwrap().contains("你好"));
        assert!(std::fs::read_to_string(&original).unwrap().contains("Hello"));

        let requests = llm.recorded_requests().await;
        assert_eq!(requests[0].max_tokens, 2000);
        assert_eq!(requests[0].temperature, 0.3);
        assert!(requests[0].prompt.contains("zh-CN"));
        assert!(requests[0].prompt.contains("Hello"));
    }

    #[tokio::test]
    async fn test_apply_skips_wanted_language() {
        let llm = Arc::new(MockLlmClient::new());
        let fallback = TranslationFallback::new(llm.clone(), langs(&["zh-CN", "en"]), "zh-CN");
        let out = fallback
            .apply(&fixtures::subtitle_record(1, "en"), Path::new("/nonexistent.srt"))
            .await
            .unwrap();
        assert!(out.is_none());
        assert_eq!(llm.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_translation_is_error() {
        let llm = Arc::new(MockLlmClient::new());
        llm.push_response("   ").await;
        let fallback = TranslationFallback::new(llm, langs(&["zh-CN"]), "zh-CN");
        let result = fallback.translate_text("1\nHello", "zh-CN").await;
        assert!(matches!(result, Err(TranslationError::Empty)));
    }
}
