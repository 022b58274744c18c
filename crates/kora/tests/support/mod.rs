use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use kora::AppConfig;
use kora_agent::Orchestrator;
use kora_llm::{ChatRequest, ChatResponse, LlmClient, LlmError, LlmResult};
use kora_memory::{EmbeddingBackend, MemoryConfig};
use parking_lot::Mutex;

/// LLM that replays queued replies in order
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<LlmResult<ChatResponse>>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<LlmResult<ChatResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, _request: ChatRequest) -> LlmResult<ChatResponse> {
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn text(content: &str) -> LlmResult<ChatResponse> {
    Ok(ChatResponse::text(content, "scripted"))
}

/// Offline configuration: hash embeddings, memory under `index_dir` if given
pub fn offline_config(index_dir: Option<&std::path::Path>) -> AppConfig {
    let mut config = AppConfig::default();
    config.memory = MemoryConfig {
        index_dir: index_dir.map(|p| p.to_path_buf()),
        ..MemoryConfig::default()
    };
    config.memory.embedding.backend = EmbeddingBackend::Hash;
    config.memory.embedding.dimensions = 32;
    config.tools.search.enabled = false;
    config.tools.gmail.enabled = false;
    config.tools.translate.enabled = false;
    config.tools.weather.enabled = false;
    config
}

pub async fn orchestrator(
    replies: Vec<LlmResult<ChatResponse>>,
    index_dir: Option<&std::path::Path>,
) -> Orchestrator {
    kora::assemble(ScriptedLlm::new(replies), &offline_config(index_dir))
        .await
        .unwrap()
}
