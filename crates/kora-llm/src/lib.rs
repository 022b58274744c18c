//! # Kora LLM
//!
//! Chat-completion client for OpenAI-compatible inference APIs, with Groq as
//! the default provider.
//!
//! - [`ChatMessage`] / [`ChatRequest`] / [`ChatResponse`]: provider-neutral
//!   message types, including tool calls and tool results
//! - [`ToolDefinition`]: JSON-schema function declarations offered to the model
//! - [`LlmClient`]: the trait every backend implements
//! - [`GroqClient`]: HTTP client for `/chat/completions`
//! - [`RetryingClient`]: exponential backoff on rate limits and 5xx errors
//!
//! ```rust,no_run
//! use kora_llm::{ChatMessage, ChatRequest, GroqClient, LlmClient};
//!
//! # async fn example() -> kora_llm::LlmResult<()> {
//! let client = GroqClient::new("llama3-70b-8192", "gsk-...");
//! let response = client
//!     .chat(ChatRequest::new(vec![ChatMessage::user("What is Rust?")]))
//!     .await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod groq;
pub mod retry;
pub mod types;

pub use client::LlmClient;
pub use config::{build_llm_client, LlmConfig, Provider};
pub use error::{LlmError, LlmResult};
pub use groq::GroqClient;
pub use retry::{RetryConfig, RetryingClient};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, FunctionCall, FunctionDefinition, Role, TokenUsage,
    ToolCall, ToolDefinition,
};
