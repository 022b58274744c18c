//! Error types for LLM calls

use thiserror::Error;

/// Result alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors returned by [`crate::LlmClient`] implementations
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced an HTTP response
    #[error("LLM transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("LLM API error {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
        /// Server-provided `retry-after`, in seconds
        retry_after: Option<u64>,
    },

    /// The API answered 2xx but the payload was not usable
    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),

    /// Client could not be built from configuration
    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Build an API error from a status and body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::InvalidResponse(_) | Self::Config(_) => false,
        }
    }

    /// Server-suggested delay before retrying, in milliseconds
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::Api {
                retry_after: Some(secs),
                ..
            } => Some(secs.saturating_mul(1000)),
            _ => None,
        }
    }
}
