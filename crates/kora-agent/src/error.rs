//! Orchestrator errors

use kora_llm::LlmError;
use kora_memory::MemoryError;
use thiserror::Error;

/// Result alias for orchestrator operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Ways a turn or a reset can fail
///
/// Tool and memory failures during a turn are not errors: tools report back
/// to the model, and memory is skipped with a warning.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model could not be reached or answered unusably
    #[error("language model failed: {0}")]
    Llm(#[from] LlmError),

    /// The model kept requesting tools without producing an answer
    #[error("no final answer after {0} planning iterations")]
    MaxIterations(usize),

    /// Blank input
    #[error("input is empty")]
    EmptyInput,

    /// Memory could not be cleared
    #[error("memory operation failed: {0}")]
    Memory(#[from] MemoryError),
}
