//! Assembling the assistant from configuration

use std::sync::Arc;

use anyhow::Context;
use kora_agent::Orchestrator;
use kora_llm::{build_llm_client, LlmClient};
use kora_memory::{build_embedding_provider, MemoryStore};
use tracing::info;

use crate::config::AppConfig;

/// Build the orchestrator with the configured language model
pub async fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let llm = build_llm_client(&config.llm).context("cannot create the language model client")?;
    assemble(llm, config).await
}

/// Build the orchestrator around an existing language model client
pub async fn assemble(llm: Arc<dyn LlmClient>, config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let provider = build_embedding_provider(&config.memory.embedding);
    let memory = MemoryStore::open(&config.memory, provider)
        .await
        .context("cannot open the memory index")?;

    let tools = config
        .tools
        .build_registry()
        .context("invalid tool configuration")?;

    info!(
        model = %llm.model_name(),
        tools = ?tools.kinds(),
        exchanges = memory.len(),
        "Assistant ready"
    );

    Ok(Orchestrator::new(
        llm,
        tools,
        Arc::new(memory),
        config.agent.clone(),
    ))
}
