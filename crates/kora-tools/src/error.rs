//! Tool errors

use thiserror::Error;

/// Result alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Typed failure of a tool invocation
///
/// None of these abort the process; the orchestrator hands the message back
/// to the model as the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No registered agent exposes this function
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Arguments missing, of the wrong type, or out of range
    #[error("invalid arguments for {function}: {message}")]
    InvalidArguments {
        /// Function that was called
        function: String,
        /// What was wrong
        message: String,
    },

    /// Agent lacks credentials or configuration
    #[error("{tool} is unavailable: {reason}")]
    Unavailable {
        /// Tool name
        tool: String,
        /// Why it cannot run
        reason: String,
    },

    /// Remote service answered with an error status
    #[error("{service} returned {status}: {body}")]
    Service {
        /// Remote service name
        service: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Transport failure talking to a remote service
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Arithmetic or linear algebra failure
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ToolError {
    /// Bad arguments for `function`
    pub fn invalid(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Tool cannot run without configuration
    pub fn unavailable(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Error status from a remote service
    pub fn service(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > 512 {
            let mut cut = 512;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::Service {
            service: service.into(),
            status,
            body,
        }
    }

    /// Math failure
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    /// Whether the model could fix this by calling again with other arguments
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::UnknownFunction(_) | Self::InvalidArguments { .. })
    }
}
