use std::fmt;

use serde::Serialize;

/// Where the orchestrator is within a turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Idle, waiting for the next query
    #[default]
    AwaitingInput,
    /// Asking the model which tools to call, running them
    Planning,
    /// Final answer produced; updating memory
    Responding,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AwaitingInput => "awaiting_input",
            Self::Planning => "planning",
            Self::Responding => "responding",
        })
    }
}
