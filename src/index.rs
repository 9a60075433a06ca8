//! In-memory similarity index over embedded documents.

use serde::Serialize;

use crate::document::Document;
use crate::embedder::{embed_all, Embedder};
use crate::error::{Result, SearchError};

/// A document paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    /// Retrieved document.
    pub document: Document,
    /// Cosine similarity to the query embedding.
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    embedding: Vec<f32>,
    document: Document,
}

/// Brute-force cosine index built once from a full document set.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Embeds every document and stores the vectors.
    pub fn build(documents: Vec<Document>, embedder: &dyn Embedder) -> Result<Self> {
        if documents.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        let texts: Vec<&str> = documents.iter().map(|doc| doc.content.as_str()).collect();
        let embeddings = embed_all(embedder, &texts).map_err(SearchError::Embedding)?;
        Self::from_embeddings(documents.into_iter().zip(embeddings))
    }

    /// Builds an index from precomputed `(document, embedding)` pairs.
    pub fn from_embeddings<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Document, Vec<f32>)>,
    {
        let mut entries = Vec::new();
        let mut dimensions = None;
        for (document, embedding) in pairs {
            let expected = *dimensions.get_or_insert(embedding.len());
            if embedding.len() != expected {
                return Err(SearchError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            entries.push(IndexEntry {
                embedding,
                document,
            });
        }
        let Some(dimensions) = dimensions else {
            return Err(SearchError::EmptyCorpus);
        };
        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of every stored vector.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embeds `query` and returns the `k` most similar documents.
    pub fn similarity_search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let mut vectors = embedder
            .embed_batch(&[query])
            .map_err(SearchError::Embedding)?;
        let query_embedding = vectors.pop().ok_or_else(|| {
            SearchError::Embedding(anyhow::anyhow!("{} returned no embedding", embedder.model()))
        })?;
        self.search_by_vector(&query_embedding, k)
    }

    /// Ranks documents by cosine similarity to `query_embedding`.
    ///
    /// Ties keep insertion order.
    pub fn search_by_vector(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredDocument>> {
        if query_embedding.len() != self.dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimensions,
                actual: query_embedding.len(),
            });
        }
        let mut results: Vec<ScoredDocument> = self
            .entries
            .iter()
            .map(|entry| ScoredDocument {
                document: entry.document.clone(),
                score: cosine_similarity(&entry.embedding, query_embedding),
            })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::documents_from_titles;
    use crate::embedder::HashingEmbedder;

    fn titles() -> Vec<&'static str> {
        vec![
            "Intro to Python",
            "Advanced SQL",
            "Deep Learning Basics",
            "Building Data Pipelines with Spark",
            "Time Series Forecasting",
        ]
    }

    #[test]
    fn exact_title_is_retrieved() {
        let embedder = HashingEmbedder::default();
        let index = VectorIndex::build(documents_from_titles(titles()), &embedder).unwrap();
        assert_eq!(index.len(), 5);

        for title in titles() {
            let results = index.similarity_search(&embedder, title, 4).unwrap();
            assert!(
                results.iter().any(|r| r.document.title() == title),
                "{title} not in {results:?}"
            );
            assert_eq!(results[0].document.title(), title);
        }
    }

    #[test]
    fn weak_queries_still_return_k_results() {
        let embedder = HashingEmbedder::default();
        let index = VectorIndex::build(documents_from_titles(titles()), &embedder).unwrap();
        let results = index.similarity_search(&embedder, "gardening", 4).unwrap();
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let embedder = HashingEmbedder::default();
        let err = VectorIndex::build(Vec::new(), &embedder).unwrap_err();
        assert!(matches!(err, SearchError::EmptyCorpus));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let pairs = vec![
            (Document::from_title("a"), vec![1.0, 0.0]),
            (Document::from_title("b"), vec![1.0, 0.0, 0.0]),
        ];
        let err = VectorIndex::from_embeddings(pairs).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn ranks_by_cosine_and_keeps_ties_in_order() {
        let pairs = vec![
            (Document::from_title("east"), vec![1.0, 0.0]),
            (Document::from_title("north"), vec![0.0, 1.0]),
            (Document::from_title("northeast"), vec![1.0, 1.0]),
            (Document::from_title("also east"), vec![2.0, 0.0]),
        ];
        let index = VectorIndex::from_embeddings(pairs).unwrap();
        let results = index.search_by_vector(&[1.0, 0.0], 3).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.document.title()).collect();
        assert_eq!(order, vec!["east", "also east", "northeast"]);
    }

    #[test]
    fn nan_scores_do_not_break_ranking() {
        let pairs = vec![
            (Document::from_title("broken"), vec![f32::NAN, 0.0]),
            (Document::from_title("east"), vec![1.0, 0.0]),
            (Document::from_title("north"), vec![0.0, 1.0]),
        ];
        let index = VectorIndex::from_embeddings(pairs).unwrap();
        let results = index.search_by_vector(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        let finite: Vec<&str> = results
            .iter()
            .filter(|r| !r.score.is_nan())
            .map(|r| r.document.title())
            .collect();
        assert_eq!(finite, vec!["east", "north"]);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
    }
}
