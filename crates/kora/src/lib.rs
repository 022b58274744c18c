//! # Kora
//!
//! A conversational assistant that answers free-text queries, delegates to
//! tool agents (math, translation, web search, Gmail, weather) when they
//! help, and remembers past exchanges through vector-similarity recall.
//!
//! ```text
//!            ┌───────────────┐  recall / remember  ┌──────────────┐
//!  query ──▶ │  Orchestrator │ ◀─────────────────▶ │ Memory Store │
//!            └──────┬────────┘                     └──────────────┘
//!                   │ chat + tool definitions
//!            ┌──────▼───────┐   tool calls   ┌─────────────────────┐
//!            │  Groq (LLM)  │ ─────────────▶ │ math · translate ·  │
//!            └──────────────┘                │ search · gmail ·    │
//!                                            │ weather             │
//!                                            └─────────────────────┘
//! ```
//!
//! The member crates can be used on their own:
//!
//! - [`kora_llm`]: chat completion client with tool calling and retries
//! - [`kora_memory`]: embeddings and the exchange index
//! - [`kora_tools`]: the tool agents and their registry
//! - [`kora_agent`]: the orchestrator
//!
//! This crate adds configuration, the interactive loop, and the HTTP server.

pub mod app;
pub mod cli;
pub mod config;
pub mod repl;
pub mod server;
pub mod telemetry;

pub use kora_agent;
pub use kora_llm;
pub use kora_memory;
pub use kora_tools;

pub use app::{assemble, build_orchestrator};
pub use config::AppConfig;

/// Common imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use kora_agent::{AgentConfig, AgentError, AgentState, Orchestrator, TurnOutcome};
    pub use kora_llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient, LlmConfig};
    pub use kora_memory::{Exchange, MemoryConfig, MemoryStore};
    pub use kora_tools::{Tool, ToolError, ToolKind, ToolRegistry, ToolsConfig};
}
