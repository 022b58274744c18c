use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::groq::{GroqClient, DEFAULT_MODEL, GROQ_BASE_URL};
use crate::retry::{RetryConfig, RetryingClient};

/// OpenAI-compatible API providers with a known base URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    OpenAi,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => GROQ_BASE_URL,
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// LLM backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    /// Read from `GROQ_API_KEY` when not set in the config file
    pub api_key: Option<String>,
    /// Overrides the provider's base URL
    pub api_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_url: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: 60,
            retry: RetryConfig::default(),
        }
    }
}

/// Build a retrying client for the configured provider
pub fn build_llm_client(config: &LlmConfig) -> LlmResult<Arc<dyn LlmClient>> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| LlmError::Config("missing API key (set GROQ_API_KEY)".to_string()))?;

    let base_url = config
        .api_url
        .clone()
        .unwrap_or_else(|| config.provider.default_base_url().to_string());

    let client = GroqClient::new(config.model.clone(), api_key)
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(config.timeout_secs))?;

    Ok(Arc::new(RetryingClient::new(client, config.retry.clone())))
}
