//! # Kora Tools
//!
//! Tool agents the orchestrator can delegate to. Each agent implements
//! [`Tool`]: it publishes the functions it offers as [`ToolDefinition`]s for
//! the model, and executes [`ToolRequest`]s against them, returning text or a
//! typed [`ToolError`].
//!
//! | Agent | Functions |
//! |-------|-----------|
//! | [`MathTool`] | `add`, `multiply`, `calculate`, `convert_units`, `matrix_operations` |
//! | [`TranslateTool`] | `translate` |
//! | [`SearchTool`] | `search_web` |
//! | [`GmailTool`] | `send_email`, `search_emails`, `read_email`, `get_labels` |
//! | [`WeatherTool`] | `get_current_weather`, `get_air_quality`, `get_geo_details` |
//!
//! [`ToolRegistry`] routes a model's [`ToolCall`](kora_llm::ToolCall) to the
//! agent that defines the function and records the outcome as a
//! [`ToolInvocation`].
//!
//! ```rust
//! use kora_llm::ToolCall;
//! use kora_tools::{MathTool, ToolRegistry};
//!
//! # tokio_test::block_on(async {
//! let registry = ToolRegistry::new().with_tool(MathTool::new());
//! let invocation = registry
//!     .execute(&ToolCall::new("call_1", "multiply", r#"{"a": 6, "b": 7}"#))
//!     .await;
//! assert_eq!(invocation.output(), "42");
//! # });
//! ```

mod config;
mod error;
pub mod gmail;
mod http;
pub mod math;
mod registry;
pub mod search;
mod tool;
pub mod translate;
pub mod weather;

pub use config::{GmailConfig, SearchConfig, ToolsConfig, TranslateConfig, WeatherConfig};
pub use error::{ToolError, ToolResult};
pub use gmail::GmailTool;
pub use kora_llm::ToolDefinition;
pub use math::MathTool;
pub use registry::ToolRegistry;
pub use search::SearchTool;
pub use tool::{Tool, ToolInvocation, ToolKind, ToolRequest};
pub use translate::TranslateTool;
pub use weather::{WeatherEndpoints, WeatherTool};
