//! Append-only exchange store with exact nearest-neighbour recall

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::MemoryConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::exchange::Exchange;
use crate::vector::{EmbeddingProvider, SearchResult};

const INDEX_FILE: &str = "index.json";
const INDEX_VERSION: u32 = 1;

/// On-disk layout of `<index_dir>/index.json`
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    dimensions: usize,
    exchanges: Vec<Exchange>,
}

/// Vector-indexed log of past query/response pairs
///
/// Entries are only ever appended, or all dropped by [`MemoryStore::clear`].
/// Search is a flat scan by Euclidean distance, which is exact.
pub struct MemoryStore {
    provider: Arc<dyn EmbeddingProvider>,
    exchanges: RwLock<Vec<Exchange>>,
    index_dir: Option<PathBuf>,
}

impl MemoryStore {
    /// Store that lives only in this process
    pub fn in_memory(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            exchanges: RwLock::new(Vec::new()),
            index_dir: None,
        }
    }

    /// Open the store described by `config`, loading a persisted index if present
    pub async fn open(
        config: &MemoryConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> MemoryResult<Self> {
        let Some(dir) = config.index_dir.clone() else {
            return Ok(Self::in_memory(provider));
        };

        let exchanges = match load_index(&dir).await? {
            Some(file) => {
                if !file.exchanges.is_empty() && file.dimensions != provider.dimensions() {
                    return Err(MemoryError::DimensionMismatch {
                        expected: provider.dimensions(),
                        actual: file.dimensions,
                    });
                }
                if file.model != provider.model_name() {
                    warn!(
                        stored = %file.model,
                        current = %provider.model_name(),
                        "Index was built with a different embedding model"
                    );
                }
                info!(path = %dir.display(), exchanges = file.exchanges.len(), "Loaded existing memory index");
                file.exchanges
            }
            None => {
                info!(path = %dir.display(), "Created new memory index");
                Vec::new()
            }
        };

        Ok(Self {
            provider,
            exchanges: RwLock::new(exchanges),
            index_dir: Some(dir),
        })
    }

    /// Embed `query` and append the exchange.
    ///
    /// Either the exchange is stored and persisted, or it is not stored at all.
    #[instrument(skip(self, query, response), fields(query_len = query.len()))]
    pub async fn remember(&self, query: &str, response: &str) -> MemoryResult<Exchange> {
        let embedding = self.provider.embed(query).await?;
        if embedding.dimensions() != self.provider.dimensions() {
            return Err(MemoryError::DimensionMismatch {
                expected: self.provider.dimensions(),
                actual: embedding.dimensions(),
            });
        }

        let exchange = Exchange::new(query, response, embedding);
        let total = {
            let mut exchanges = self.exchanges.write();
            exchanges.push(exchange.clone());
            exchanges.len()
        };
        debug!(exchange_id = %exchange.id, total, "Stored exchange");

        if let Err(e) = self.save().await {
            // unsaved exchanges must not reach disk with a later save
            self.exchanges.write().retain(|stored| stored.id != exchange.id);
            return Err(e);
        }
        Ok(exchange)
    }

    /// The `k` exchanges nearest to `query`, closest first
    pub async fn recall(&self, query: &str, k: usize) -> MemoryResult<Vec<Exchange>> {
        Ok(self
            .recall_scored(query, k)
            .await?
            .into_iter()
            .map(|r| r.item)
            .collect())
    }

    /// As [`MemoryStore::recall`], with distance and cosine score per result
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn recall_scored(
        &self,
        query: &str,
        k: usize,
    ) -> MemoryResult<Vec<SearchResult<Exchange>>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;

        let mut results = {
            let exchanges = self.exchanges.read();
            exchanges
                .iter()
                .map(|exchange| {
                    let distance = query_embedding.euclidean_distance(&exchange.embedding)?;
                    let score = query_embedding.cosine_similarity(&exchange.embedding)?;
                    Ok(SearchResult::new(exchange.clone(), distance, score))
                })
                .collect::<MemoryResult<Vec<_>>>()?
        };

        // stable: equal distances keep insertion order
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);

        debug!(returned = results.len(), "Recalled exchanges");
        Ok(results)
    }

    /// Drop every exchange
    pub async fn clear(&self) -> MemoryResult<()> {
        let dropped = {
            let mut exchanges = self.exchanges.write();
            let n = exchanges.len();
            exchanges.clear();
            n
        };
        info!(dropped, "Cleared memory");
        self.save().await
    }

    /// Write the index to disk; no-op for in-process stores
    pub async fn save(&self) -> MemoryResult<()> {
        let Some(dir) = &self.index_dir else {
            return Ok(());
        };

        let file = IndexFile {
            version: INDEX_VERSION,
            model: self.provider.model_name().to_string(),
            dimensions: self.provider.dimensions(),
            exchanges: self.exchanges(),
        };
        save_index(dir, &file).await
    }

    /// Number of stored exchanges
    pub fn len(&self) -> usize {
        self.exchanges.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.exchanges.read().is_empty()
    }

    /// Snapshot of all exchanges in insertion order
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.read().clone()
    }

    /// Directory the index is persisted to
    pub fn index_dir(&self) -> Option<&Path> {
        self.index_dir.as_deref()
    }

    /// Embedding provider in use
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }
}

async fn load_index(dir: &Path) -> MemoryResult<Option<IndexFile>> {
    let path = dir.join(INDEX_FILE);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MemoryError::io("read index", e)),
    };

    let file: IndexFile = serde_json::from_slice(&bytes)?;
    if file.version != INDEX_VERSION {
        return Err(MemoryError::UnsupportedVersion(file.version));
    }
    Ok(Some(file))
}

async fn save_index(dir: &Path, file: &IndexFile) -> MemoryResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| MemoryError::io("create index dir", e))?;

    let bytes = serde_json::to_vec(file)?;
    let tmp = dir.join(format!("{INDEX_FILE}.tmp"));
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| MemoryError::io("write index", e))?;
    tokio::fs::rename(&tmp, dir.join(INDEX_FILE))
        .await
        .map_err(|e| MemoryError::io("replace index", e))?;

    debug!(path = %dir.display(), exchanges = file.exchanges.len(), "Saved memory index");
    Ok(())
}
