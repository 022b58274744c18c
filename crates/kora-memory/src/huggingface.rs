//! HuggingFace Inference API embeddings (feature-extraction pipeline)

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{MemoryError, MemoryResult};
use crate::vector::{Embedding, EmbeddingProvider};

/// Sentence-transformers model used by default
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output size of [`DEFAULT_EMBEDDING_MODEL`]
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction";

const PROVIDER: &str = "huggingface";

/// Embeddings from the hosted HuggingFace feature-extraction pipeline
pub struct HuggingFaceEmbeddingProvider {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    model: String,
    dimensions: usize,
}

impl HuggingFaceEmbeddingProvider {
    /// Provider for the default MiniLM model
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_model(token, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_DIMENSIONS)
    }

    /// Provider for any feature-extraction model with known output size
    pub fn with_model(token: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        let model = model.into();
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{INFERENCE_BASE_URL}/{model}"),
            token: token.into(),
            model,
            dimensions,
        }
    }

    /// Override the full endpoint URL (self-hosted inference or tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Reduce a feature-extraction payload to one sentence vector.
///
/// Sentence-transformer pipelines return `[f32]`; raw transformer pipelines
/// return per-token rows `[[f32]]` (optionally wrapped in a batch), which are
/// mean-pooled.
fn pool(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    let first = items.first()?;

    if first.is_number() {
        return items.iter().map(|v| v.as_f64().map(|f| f as f32)).collect();
    }

    if first.as_array().map_or(false, |inner| inner.first().map_or(false, Value::is_array)) {
        return pool(first);
    }

    let rows: Vec<Vec<f32>> = items.iter().map(pool).collect::<Option<_>>()?;
    let width = rows.first()?.len();
    if rows.iter().any(|r| r.len() != width) {
        return None;
    }

    let mut mean = vec![0.0f32; width];
    for row in &rows {
        for (acc, x) in mean.iter_mut().zip(row) {
            *acc += x;
        }
    }
    let n = rows.len() as f32;
    mean.iter_mut().for_each(|x| *x /= n);
    Some(mean)
}

#[async_trait::async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddingProvider {
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> MemoryResult<Embedding> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": text, "options": { "wait_for_model": true } }))
            .send()
            .await
            .map_err(|e| MemoryError::embedding(PROVIDER, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemoryError::embedding(
                PROVIDER,
                format!("API error {status}: {body}"),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| MemoryError::embedding(PROVIDER, format!("invalid response: {e}")))?;

        let vector = pool(&payload)
            .ok_or_else(|| MemoryError::embedding(PROVIDER, "unexpected embedding shape"))?;

        if vector.len() != self.dimensions {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        debug!(dimensions = vector.len(), "Generated embedding");
        Ok(Embedding::new(vector, self.model.clone()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
