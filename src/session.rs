//! Search session context: owns the embedder and the lazily built index.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::dataset::load_titles;
use crate::document::documents_from_titles;
use crate::embedder::Embedder;
use crate::error::{Result, SearchError};
use crate::index::{ScoredDocument, VectorIndex};
use crate::splitter::TextSplitter;

/// Documents retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;
/// Retrieved documents shown alongside an answer.
pub const DEFAULT_DISPLAY_LIMIT: usize = 3;

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// CSV produced by the scraper.
    pub csv_path: PathBuf,
    /// Number of documents retrieved per query.
    pub top_k: usize,
    /// Number of retrieved documents returned for display.
    pub display_limit: usize,
    /// Chunking applied before embedding.
    pub splitter: TextSplitter,
}

impl SessionConfig {
    /// Config with default retrieval settings for `csv_path`.
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            top_k: DEFAULT_TOP_K,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            splitter: TextSplitter::default(),
        }
    }
}

/// Result of a build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A fresh index was built.
    Built {
        /// Documents read from the CSV.
        documents: usize,
        /// Chunks embedded after splitting.
        chunks: usize,
    },
    /// An index already existed; nothing was done.
    AlreadyBuilt,
}

/// Explicit context passed to the index builder and query handler.
pub struct SearchSession {
    config: SessionConfig,
    embedder: Arc<dyn Embedder>,
    index: Option<VectorIndex>,
}

impl SearchSession {
    /// Creates a session with no index.
    pub fn new(config: SessionConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            index: None,
        }
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Embedder used for documents and queries.
    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// True once an index has been built.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// The built index, if any.
    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Builds the index unless one already exists.
    ///
    /// A failed build leaves the session not ready.
    pub fn build_index(&mut self) -> Result<BuildOutcome> {
        if self.is_ready() {
            info!("index already built; skipping");
            return Ok(BuildOutcome::AlreadyBuilt);
        }
        self.build_fresh()
    }

    /// Discards any existing index and builds a new one from the CSV.
    pub fn rebuild_index(&mut self) -> Result<BuildOutcome> {
        self.index = None;
        self.build_fresh()
    }

    fn build_fresh(&mut self) -> Result<BuildOutcome> {
        let titles = load_titles(&self.config.csv_path)?;
        let documents = documents_from_titles(titles);
        let chunks = self.config.splitter.split_documents(&documents);
        let outcome = BuildOutcome::Built {
            documents: documents.len(),
            chunks: chunks.len(),
        };
        info!(
            csv = %self.config.csv_path.display(),
            documents = documents.len(),
            chunks = chunks.len(),
            chunk_size = self.config.splitter.chunk_size(),
            chunk_overlap = self.config.splitter.chunk_overlap(),
            model = self.embedder.model(),
            "building vector index"
        );
        let index = VectorIndex::build(chunks, self.embedder.as_ref())?;
        info!(
            entries = index.len(),
            dimensions = index.dimensions(),
            "vector index ready"
        );
        self.index = Some(index);
        Ok(outcome)
    }

    /// Retrieves the `top_k` documents most similar to `query`.
    pub fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let index = self.index.as_ref().ok_or(SearchError::IndexNotReady)?;
        index.similarity_search(self.embedder.as_ref(), query, self.config.top_k)
    }
}
