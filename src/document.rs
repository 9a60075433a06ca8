//! Embedding-ready documents derived from course titles.

use serde::{Deserialize, Serialize};

/// Metadata carried alongside each document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Course title the document came from.
    pub title: String,
}

/// Unit of text submitted to the embedding model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Text that gets embedded.
    pub content: String,
    /// Source metadata.
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Builds a document whose content and metadata are both the title.
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            content: title.clone(),
            metadata: DocumentMetadata { title },
        }
    }

    /// Title recorded in the metadata.
    pub fn title(&self) -> &str {
        &self.metadata.title
    }
}

/// Maps titles one-to-one onto documents, preserving order.
pub fn documents_from_titles<I, S>(titles: I) -> Vec<Document>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    titles.into_iter().map(Document::from_title).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_becomes_content_and_metadata() {
        let docs = documents_from_titles(["Intro to Python", "Advanced SQL"]);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "Intro to Python");
        assert_eq!(docs[0].title(), "Intro to Python");
        assert_eq!(docs[1].metadata.title, "Advanced SQL");
    }
}
