//! Embedding seam: provider trait, batching, and cosine similarity

use crate::{chunk::Chunk, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for embedding providers.
///
/// The retrieval core has no compile-time coupling to any embedding
/// vendor; callers inject an implementation at construction time. A
/// provider must return one vector per input text, in input order, all of
/// one fixed dimensionality, and support batch sizes up to at least 100.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Batch embed multiple texts, one vector per input, preserving order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimension
    fn dimension(&self) -> usize;

    /// Get model identifier
    fn model_id(&self) -> &str;

    /// Embed a query (providers may treat queries asymmetrically)
    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed(query)
    }
}

/// Batching configuration for the embedding step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of chunks per provider call
    pub batch_size: usize,
    /// Pause between consecutive batches; backpressure against external
    /// provider rate limits
    pub batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_delay: Duration::from_millis(100),
        }
    }
}

/// Embed chunks in fixed-size batches, updating them in place.
///
/// Batches are issued sequentially with [`BatchConfig::batch_delay`]
/// between them. A failed batch does not abort the rest: its chunks stay
/// without an embedding (degrading that subset to keyword search) and the
/// failure is reported as a warning. Returns the number of chunks that
/// received an embedding.
pub fn embed_chunks<E: Embedder + ?Sized>(
    chunks: &mut [Chunk],
    embedder: &E,
    config: &BatchConfig,
) -> usize {
    let batch_size = config.batch_size.max(1);
    let total_batches = chunks.len().div_ceil(batch_size);
    let mut embedded = 0usize;

    for (batch_no, batch) in chunks.chunks_mut(batch_size).enumerate() {
        if batch_no > 0 && !config.batch_delay.is_zero() {
            std::thread::sleep(config.batch_delay);
        }

        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        match embedder.embed_batch(&texts) {
            Ok(embeddings) if embeddings.len() == batch.len() => {
                for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                    chunk.set_embedding(embedding);
                    embedded += 1;
                }
            }
            Ok(embeddings) => {
                log::warn!(
                    "embedding batch {}/{total_batches} returned {} vectors for {} texts, skipping",
                    batch_no + 1,
                    embeddings.len(),
                    batch.len()
                );
            }
            Err(err) => {
                log::warn!(
                    "embedding batch {}/{total_batches} failed, continuing without embeddings: {err}",
                    batch_no + 1
                );
            }
        }
    }

    embedded
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in `[-1, 1]`. Zero-norm vectors and mismatched lengths
/// both yield `0.0` rather than an error, so a single malformed embedding
/// degrades one chunk's ranking instead of crashing a whole query.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Mock embedder for testing (uses simple hash-based vectors)
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
    model_id: String,
}

impl MockEmbedder {
    /// Create a new mock embedder
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: "mock-embedder".to_string(),
        }
    }

    /// Set the model ID
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vector = Vec::with_capacity(self.dimension);
        let mut hasher = DefaultHasher::new();

        for i in 0..self.dimension {
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let hash = hasher.finish();
            // Map the hash into [-1, 1]
            let value = (hash as f32 / u64::MAX as f32) * 2.0 - 1.0;
            vector.push(value);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::Embedding("empty text".to_string()));
        }
        Ok(self.hash_to_vector(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
