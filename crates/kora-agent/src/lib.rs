//! # Kora Agent
//!
//! The orchestrator ties the language model, the tool agents and the
//! exchange memory together. For each query it:
//!
//! 1. recalls the most similar past exchanges,
//! 2. lets the model plan, executing any tool calls it requests and feeding
//!    the results back, until the model answers,
//! 3. stores the query and answer in memory.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kora_agent::{AgentConfig, Orchestrator};
//! use kora_llm::GroqClient;
//! use kora_memory::{HashEmbeddingProvider, MemoryStore};
//! use kora_tools::{MathTool, ToolRegistry};
//!
//! # async fn example() -> kora_agent::AgentResult<()> {
//! let llm = Arc::new(GroqClient::new("llama3-70b-8192", "gsk-..."));
//! let tools = ToolRegistry::new().with_tool(MathTool::new());
//! let memory = Arc::new(MemoryStore::in_memory(Arc::new(HashEmbeddingProvider::new(384))));
//!
//! let mut agent = Orchestrator::new(llm, tools, memory, AgentConfig::default());
//! let outcome = agent.handle_turn("What is 12 * 7?").await?;
//! println!("{}", outcome.response);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod orchestrator;
mod state;

pub use config::{AgentConfig, DEFAULT_SYSTEM_PROMPT};
pub use error::{AgentError, AgentResult};
pub use orchestrator::{Orchestrator, TurnOutcome};
pub use state::AgentState;
