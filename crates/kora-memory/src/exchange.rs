//! One completed query/response turn

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vector::Embedding;

/// A stored query/response pair with the embedding of its query
///
/// Exchanges are immutable once stored: fields are public for reading, and
/// the store only ever hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique identifier
    pub id: Uuid,

    /// What the user asked
    pub query: String,

    /// What the assistant answered
    pub response: String,

    /// Embedding of `query`
    pub embedding: Embedding,

    /// When the exchange was stored
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Create a new exchange
    pub fn new(query: impl Into<String>, response: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            response: response.into(),
            embedding,
            created_at: Utc::now(),
        }
    }

    /// Render as a context line for prompts
    pub fn as_context(&self) -> String {
        format!("User: {}\nAssistant: {}", self.query, self.response)
    }
}
