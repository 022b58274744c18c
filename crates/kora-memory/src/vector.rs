//! Vector embeddings and similarity metrics
//!
//! Provides the [`Embedding`] type, the [`EmbeddingProvider`] trait every
//! embedding backend implements, and a deterministic hash-based provider for
//! offline use and tests.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{MemoryError, MemoryResult};

/// Dense embedding vector tagged with the model that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Components
    pub vector: Vec<f32>,

    /// Producing model
    pub model: String,
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Embedding {
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            vector,
            model: model.into(),
        }
    }

    /// Number of components
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        dot(&self.vector, &self.vector).sqrt()
    }

    fn same_shape(&self, other: &Embedding) -> MemoryResult<()> {
        match (self.dimensions(), other.dimensions()) {
            (expected, actual) if expected != actual => {
                Err(MemoryError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Cosine of the angle to `other`; zero when either vector is zero
    pub fn cosine_similarity(&self, other: &Embedding) -> MemoryResult<f32> {
        self.same_shape(other)?;
        let norms = self.norm() * other.norm();
        if norms == 0.0 {
            return Ok(0.0);
        }
        Ok(dot(&self.vector, &other.vector) / norms)
    }

    /// L2 distance to `other`
    pub fn euclidean_distance(&self, other: &Embedding) -> MemoryResult<f32> {
        self.same_shape(other)?;
        let squared: f32 = self
            .vector
            .iter()
            .zip(&other.vector)
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        Ok(squared.sqrt())
    }
}

/// Turns text into embeddings
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> MemoryResult<Embedding>;

    /// Model identifier, persisted with the index
    fn model_name(&self) -> &str;

    /// Length of the vectors produced
    fn dimensions(&self) -> usize;
}

/// Offline provider deriving vectors from a SHA-256 of the text.
///
/// Identical texts get identical vectors, so repeated questions are found,
/// but there is no notion of meaning. Used when no embedding token is set.
/// Vectors are persisted, so the derivation must never change: component `i`
/// comes from `SHA-256(SHA-256(text) || le_u64(i / 4))`, eight bytes each.
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn components(&self, text: &str) -> Vec<f32> {
        let seed = Sha256::digest(text.as_bytes());
        let mut out = Vec::with_capacity(self.dimensions);

        for block in 0u64.. {
            if out.len() >= self.dimensions {
                break;
            }
            let digest = Sha256::new()
                .chain_update(seed)
                .chain_update(block.to_le_bytes())
                .finalize();
            for chunk in digest.chunks_exact(8).take(self.dimensions - out.len()) {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                let raw = u64::from_le_bytes(bytes);
                // map to [-1, 1]
                out.push((raw as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32);
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> MemoryResult<Embedding> {
        Ok(Embedding::new(self.components(text), HASH_EMBEDDING_MODEL))
    }

    fn model_name(&self) -> &str {
        HASH_EMBEDDING_MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Model name recorded for hash embeddings
pub const HASH_EMBEDDING_MODEL: &str = "hash-sha256";

/// A recalled item with its distance (lower is closer) and cosine score
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    pub item: T,
    pub distance: f32,
    pub score: f32,
}

impl<T> SearchResult<T> {
    pub fn new(item: T, distance: f32, score: f32) -> Self {
        Self {
            item,
            distance,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(v: &[f32]) -> Embedding {
        Embedding::new(v.to_vec(), "test")
    }

    #[test]
    fn cosine_of_parallel_and_orthogonal() {
        let x = emb(&[1.0, 0.0, 0.0]);
        let y = emb(&[0.0, 2.0, 0.0]);

        assert!((x.cosine_similarity(&emb(&[3.0, 0.0, 0.0])).unwrap() - 1.0).abs() < 1e-6);
        assert!(x.cosine_similarity(&y).unwrap().abs() < 1e-6);
        assert_eq!(x.cosine_similarity(&emb(&[0.0, 0.0, 0.0])).unwrap(), 0.0);
    }

    #[test]
    fn euclidean() {
        let x = emb(&[1.0, 0.0]);
        let y = emb(&[0.0, 1.0]);

        assert_eq!(x.euclidean_distance(&x).unwrap(), 0.0);
        assert!((x.euclidean_distance(&y).unwrap() - std::f32::consts::SQRT_2).abs() < 1e-6);
        assert!((emb(&[3.0, 4.0]).norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn shapes_must_match() {
        let short = emb(&[1.0, 0.0]);
        let long = emb(&[1.0, 0.0, 0.0]);

        assert!(matches!(
            short.euclidean_distance(&long),
            Err(MemoryError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(long.cosine_similarity(&short).is_err());
    }

    #[tokio::test]
    async fn hash_provider_is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);

        let a = provider.embed("Hello world").await.unwrap();
        let b = provider.embed("Hello world").await.unwrap();
        let c = provider.embed("Something else").await.unwrap();

        assert_eq!(a.dimensions(), 64);
        assert_eq!(a.model, HASH_EMBEDDING_MODEL);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.vector.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[tokio::test]
    async fn hash_vectors_are_pinned() {
        let v = HashEmbeddingProvider::new(6).embed("Hello world").await.unwrap().vector;

        assert_eq!(v.len(), 6);
        assert!((v[0] - 0.008_522_076).abs() < 1e-6, "{}", v[0]);
        assert!((v[2] + 0.827_416_2).abs() < 1e-6, "{}", v[2]);
        // first component of the second digest block
        assert!((v[4] - 0.507_459_1).abs() < 1e-6, "{}", v[4]);
    }
}
