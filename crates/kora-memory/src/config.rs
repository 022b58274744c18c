//! Memory configuration

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::huggingface::{
    HuggingFaceEmbeddingProvider, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL,
};
use crate::vector::{EmbeddingProvider, HashEmbeddingProvider};

/// Which embedding backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// HuggingFace Inference API (needs a token)
    #[default]
    HuggingFace,
    /// Deterministic hash vectors, offline
    Hash,
}

/// Embedding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend selection
    pub backend: EmbeddingBackend,

    /// Model identifier
    pub model: String,

    /// Vector size the model produces
    pub dimensions: usize,

    /// Access token (read from `HF_TOKEN` when unset)
    pub token: Option<String>,

    /// Full endpoint override
    pub endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::HuggingFace,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            token: None,
            endpoint: None,
        }
    }
}

/// Configuration for the exchange memory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Directory holding `index.json`; `None` keeps memory in-process only
    pub index_dir: Option<PathBuf>,

    /// Embedding backend
    pub embedding: EmbeddingConfig,
}

impl MemoryConfig {
    /// In-process memory with the given embedding settings
    pub fn new(embedding: EmbeddingConfig) -> Self {
        Self {
            index_dir: None,
            embedding,
        }
    }

    /// Persist the index under `dir`
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            index_dir: Some(PathBuf::from("faiss_index")),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Build the configured embedding provider.
///
/// A HuggingFace backend without a token degrades to hash embeddings of the
/// same size so the assistant still runs; recall then only matches repeated
/// wording.
pub fn build_embedding_provider(config: &EmbeddingConfig) -> Arc<dyn EmbeddingProvider> {
    match (config.backend, config.token.as_deref().filter(|t| !t.is_empty())) {
        (EmbeddingBackend::HuggingFace, Some(token)) => {
            let mut provider =
                HuggingFaceEmbeddingProvider::with_model(token, &config.model, config.dimensions);
            if let Some(endpoint) = &config.endpoint {
                provider = provider.with_endpoint(endpoint);
            }
            Arc::new(provider)
        }
        (EmbeddingBackend::HuggingFace, None) => {
            warn!("No embedding token configured (HF_TOKEN); falling back to hash embeddings");
            Arc::new(HashEmbeddingProvider::new(config.dimensions))
        }
        (EmbeddingBackend::Hash, _) => Arc::new(HashEmbeddingProvider::new(config.dimensions)),
    }
}
