//! Text embedding backends.

use anyhow::Result;

pub mod hashing;
pub mod huggingface;

pub use hashing::HashingEmbedder;
pub use huggingface::HuggingFaceEmbedder;

/// Anything that turns strings into fixed-length vectors.
pub trait Embedder: Send + Sync {
    /// Model identifier reported in logs.
    fn model(&self) -> &str;

    /// Maximum number of inputs accepted by one `embed_batch` call.
    fn batch_size(&self) -> usize;

    /// Embeds `inputs`, returning one vector per input in the same order.
    fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// Embeds an arbitrary number of strings by slicing them into batches.
pub fn embed_all(embedder: &dyn Embedder, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
    let mut out = Vec::with_capacity(inputs.len());
    for batch in inputs.chunks(embedder.batch_size().max(1)) {
        let vectors = embedder.embed_batch(batch)?;
        anyhow::ensure!(
            vectors.len() == batch.len(),
            "{} returned {} embeddings for {} inputs",
            embedder.model(),
            vectors.len(),
            batch.len()
        );
        out.extend(vectors);
    }
    Ok(out)
}
