//! Memory store errors

use thiserror::Error;

/// Result alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors raised by the memory store and embedding providers
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Embedding generation failed; callers may continue without memory
    #[error("embedding failed ({provider}): {message}")]
    Embedding {
        /// Provider that failed
        provider: String,
        /// Failure description
        message: String,
    },

    /// Vectors of different lengths cannot be compared or mixed in one index
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions of the index
        expected: usize,
        /// Dimensions of the offending vector
        actual: usize,
    },

    /// Filesystem failure while loading or saving the index
    #[error("index I/O failed during {operation}: {source}")]
    Io {
        /// What was being done
        operation: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Persisted index could not be encoded or decoded
    #[error("index serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted index written by an incompatible version
    #[error("unsupported index version {0}")]
    UnsupportedVersion(u32),
}

impl MemoryError {
    /// Embedding failure from `provider`
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Embedding {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// I/O failure during `operation`
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the turn can proceed without memory
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Embedding { .. } | Self::DimensionMismatch { .. })
    }
}
