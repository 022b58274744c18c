use serde::{Deserialize, Serialize};

/// Instructions given to the model at the start of every turn
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Kora, a helpful assistant. Answer compactly but \
include the relevant facts. Use the available tools when they help: math for calculations and \
unit conversions, translate for translations, search_web for current information, the Gmail \
tools for email and the weather tools for weather and air quality. When an email is sent, just \
confirm whether it was sent. Only mention email when the user asked about it.";

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// System prompt
    pub system_prompt: String,

    /// Past exchanges recalled as context per turn
    pub recall_k: usize,

    /// Upper bound on LLM calls per turn
    pub max_iterations: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Completion token limit
    pub max_tokens: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            recall_k: 3,
            max_iterations: 5,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl AgentConfig {
    /// Replace the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set how many exchanges to recall
    pub fn with_recall_k(mut self, k: usize) -> Self {
        self.recall_k = k;
        self
    }

    /// Set the planning iteration bound (at least one)
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n.max(1);
        self
    }
}
