//! Query handler: retrieve course titles, then ask the chat model.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, SearchError};
use crate::index::ScoredDocument;
use crate::llm::{LlmProvider, ProviderRequest};
use crate::session::SearchSession;

/// Answer plus the documents shown with it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Model output, verbatim.
    pub answer: String,
    /// Leading retrieved documents with their scores, at most the session's
    /// display limit.
    pub documents: Vec<ScoredDocument>,
    /// Time spent on retrieval and generation.
    pub elapsed: Duration,
}

/// Answers `query` from the session's index using `llm`.
///
/// The query reaches retrieval and the prompt exactly as typed.
pub fn answer_query(
    session: &SearchSession,
    llm: &dyn LlmProvider,
    query: &str,
) -> Result<QueryResult> {
    if query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    let start = Instant::now();
    let retrieved = session.retrieve(query)?;
    let prompt = build_prompt(query, &render_context(&retrieved));
    let answer = llm
        .answer(&ProviderRequest::new(&prompt))
        .map_err(SearchError::Completion)?;
    let elapsed = start.elapsed();

    let mut documents = retrieved;
    documents.truncate(session.config().display_limit);
    info!(
        query,
        shown = documents.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "answered query"
    );
    Ok(QueryResult {
        answer,
        documents,
        elapsed,
    })
}

/// Joins retrieved contents into the context block.
pub fn render_context(retrieved: &[ScoredDocument]) -> String {
    retrieved
        .iter()
        .map(|scored| scored.document.content.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fills the fixed prompt template.
pub fn build_prompt(question: &str, context_block: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Based on the provided context, answer the question and provide only 5 relevant course titles.\n",
    );
    prompt.push_str("<context>\n");
    prompt.push_str(context_block);
    prompt.push_str("\n<context>\n");
    prompt.push_str("Question:");
    prompt.push_str(question);
    prompt.push_str("\nAnswer with only 5 relevant course titles, please.\n");
    prompt
}
