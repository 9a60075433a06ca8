#![warn(missing_docs)]
//! Core library for coursefinder: catalog scraping, course CSV handling and
//! retrieval-augmented course search.

pub mod catalog;
pub mod controls;
pub mod course;
pub mod dataset;
pub mod document;
pub mod embedder;
pub mod error;
pub mod index;
pub mod llm;
pub mod logging;
pub mod query;
pub mod session;
pub mod splitter;
pub mod ui;

pub use catalog::{collect_pages, parse_listing, CatalogScraper, ScrapeReport};
pub use controls::{ScrapeCli, ScrapeControls};
pub use course::CourseRecord;
pub use document::{Document, DocumentMetadata};
pub use embedder::{Embedder, HashingEmbedder, HuggingFaceEmbedder};
pub use error::SearchError;
pub use index::{ScoredDocument, VectorIndex};
pub use llm::{GroqProvider, LlmProvider, ProviderRequest};
pub use query::{answer_query, QueryResult};
pub use session::{BuildOutcome, SearchSession, SessionConfig};
pub use splitter::TextSplitter;
