//! Offline bag-of-words embedder based on feature hashing.
//!
//! Each lowercase word outside a short stopword list is hashed (CRC32) into
//! one of `dimensions` buckets; the bucket counts are L2-normalized. Short
//! catalog terms such as "AI", "ML" or "R" count as words. Texts
//! sharing words end up with positive cosine similarity, which is enough for
//! deterministic tests and for running the UI without an embedding service.

use anyhow::Result;
use crc32fast::Hasher as Crc32;

use super::Embedder;

/// Default vector length, matching the hosted MiniLM model.
pub const DEFAULT_DIMENSIONS: usize = 384;

const MODEL_NAME: &str = "feature-hashing";
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// Deterministic embedder that needs no network access.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Builds an embedder producing vectors of `dimensions` length.
    pub fn new(dimensions: usize) -> Result<Self> {
        anyhow::ensure!(dimensions > 0, "embedding dimensions must be positive");
        Ok(Self { dimensions })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let mut hasher = Crc32::new();
            hasher.update(token.as_bytes());
            let bucket = hasher.finalize() as usize % self.dimensions;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn model(&self) -> &str {
        MODEL_NAME
    }

    fn batch_size(&self) -> usize {
        usize::MAX
    }

    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(inputs.iter().map(|text| self.embed_one(text)).collect())
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|tok| !tok.is_empty())
        .map(str::to_lowercase)
        .filter(|tok| !STOPWORDS.contains(&tok.as_str()))
}
