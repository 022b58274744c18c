//! Client for OpenAI-compatible `/chat/completions` endpoints (Groq by default)

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage, ToolCall, ToolDefinition};

/// Groq's OpenAI-compatible API root
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used by default
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// HTTP chat client for Groq and other OpenAI-compatible servers
pub struct GroqClient {
    base_url: String,
    model: String,
    api_key: String,
    http: reqwest::Client,
}

impl GroqClient {
    /// Client against the public Groq API
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at another OpenAI-compatible root (no trailing `/chat/completions`)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> LlmResult<Self> {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    /// API root in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body(&self, request: ChatRequest) -> WireRequest {
        let tool_choice = (!request.tools.is_empty()).then_some("auto");
        WireRequest {
            model: self.model.clone(),
            messages: request.messages,
            tools: request.tools,
            tool_choice,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len(), tools = request.tools.len()))]
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(request);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
                retry_after,
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to decode completion: {e}")))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in completion".to_string()))?;

        let tool_calls = choice.message.tool_calls.unwrap_or_default();
        debug!(
            tool_calls = tool_calls.len(),
            finish_reason = ?choice.finish_reason,
            "Completion received"
        );

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: if wire.model.is_empty() {
                self.model.clone()
            } else {
                wire.model
            },
            usage: wire.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
