//! Error type shared by the index builder and query handler.

use thiserror::Error;

/// Failures surfaced while loading courses, building the index or answering queries.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The CSV header lacks a required column.
    #[error("CSV file must contain a '{column}' column.")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },
    /// A query arrived before the index was built.
    #[error("index is not ready; build it first")]
    IndexNotReady,
    /// The query text was empty after trimming.
    #[error("query text must not be empty")]
    EmptyQuery,
    /// No documents were available to index.
    #[error("no course titles found to index")]
    EmptyCorpus,
    /// Embedding vectors disagree on length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the first vector seen.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
    /// The embedding service failed.
    #[error("embedding error: {0:#}")]
    Embedding(anyhow::Error),
    /// The chat-completion service failed.
    #[error("completion error: {0:#}")]
    Completion(anyhow::Error),
    /// The CSV could not be parsed or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T, E = SearchError> = std::result::Result<T, E>;
