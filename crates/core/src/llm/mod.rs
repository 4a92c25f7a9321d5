//! LLM client abstraction and implementations.
//!
//! Used to clean up noisy release names and to translate subtitles.

mod client;
mod config;
mod openai;

pub use client::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage,
    OllamaClient,
};
pub use config::{LlmConfig, LlmProvider};
pub use openai::OpenAiClient;

use std::sync::Arc;
use std::time::Duration;

/// Build the client selected by `[llm] provider`.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let api_key = config.api_key.clone().unwrap_or_default();

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => {
            if api_key.is_empty() {
                return Err(LlmError::NotConfigured(
                    "llm.api_key is required for the open_ai provider".to_string(),
                ));
            }
            let mut client = OpenAiClient::new(api_key, &config.model, timeout)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::Anthropic => {
            if api_key.is_empty() {
                return Err(LlmError::NotConfigured(
                    "llm.api_key is required for the anthropic provider".to_string(),
                ));
            }
            let mut client = AnthropicClient::new(api_key, &config.model, timeout)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model, timeout)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
    };

    Ok(client)
}
