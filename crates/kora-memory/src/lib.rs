//! # Kora Memory
//!
//! Vector-similarity memory of past conversation turns.
//!
//! Every completed turn is stored as an [`Exchange`] together with the
//! embedding of its query. Before answering, the orchestrator recalls the
//! exchanges nearest to the new query and feeds them to the model as context.
//!
//! ## Operations
//!
//! - [`MemoryStore::remember`]: embed and append an exchange
//! - [`MemoryStore::recall`]: k nearest exchanges by Euclidean distance
//! - [`MemoryStore::clear`]: drop everything
//!
//! The store is append-only apart from the full clear. With an index
//! directory configured it is persisted to `<index_dir>/index.json` after
//! every change.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kora_memory::{HashEmbeddingProvider, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> kora_memory::MemoryResult<()> {
//! let store = MemoryStore::in_memory(Arc::new(HashEmbeddingProvider::new(384)));
//!
//! store.remember("What is Rust?", "A systems programming language").await?;
//! let context = store.recall("What is Rust?", 3).await?;
//! assert_eq!(context[0].response, "A systems programming language");
//!
//! store.clear().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod exchange;
mod huggingface;
mod store;
pub mod vector;

pub use config::{build_embedding_provider, EmbeddingBackend, EmbeddingConfig, MemoryConfig};
pub use error::{MemoryError, MemoryResult};
pub use exchange::Exchange;
pub use huggingface::{
    HuggingFaceEmbeddingProvider, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
};
pub use store::MemoryStore;
pub use vector::{
    Embedding, EmbeddingProvider, HashEmbeddingProvider, SearchResult, HASH_EMBEDDING_MODEL,
};
