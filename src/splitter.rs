//! Recursive character splitter applied to documents before embedding.
//!
//! Text is split on the coarsest separator it contains (paragraph, line,
//! word, then character), pieces are merged back up to `chunk_size`
//! characters, and each new chunk starts with up to `chunk_overlap`
//! characters of trailing context from the previous one.

use std::collections::VecDeque;

use anyhow::Result;

use crate::document::Document;

/// Default maximum characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default characters shared between adjacent chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splitter tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// Builds a splitter with the default separator ladder.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        anyhow::ensure!(chunk_size > 0, "chunk size must be positive");
        anyhow::ensure!(
            chunk_overlap < chunk_size,
            "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
        );
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Maximum characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters carried over between chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits every document, copying its metadata onto each chunk.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut out = Vec::with_capacity(documents.len());
        for doc in documents {
            for chunk in self.split_text(&doc.content) {
                out.push(Document {
                    content: chunk,
                    metadata: doc.metadata.clone(),
                });
            }
        }
        out
    }

    /// Splits `text` into chunks no longer than `chunk_size` characters
    /// (unless a single unsplittable piece is longer).
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            if text.trim().is_empty() {
                return Vec::new();
            }
            return vec![text.to_string()];
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);
                loop {
                    let joiner = if window.is_empty() { 0 } else { sep_len };
                    let too_long = total > 0 && total + len + joiner > self.chunk_size;
                    if total <= self.chunk_overlap && !too_long {
                        break;
                    }
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    let dropped = char_len(front) + if window.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(dropped);
                }
            }
            if !window.is_empty() {
                total += sep_len;
            }
            window.push_back(piece);
            total += len;
        }
        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::documents_from_titles;

    #[test]
    fn short_titles_pass_through_unchanged() {
        let splitter = TextSplitter::default();
        let docs = documents_from_titles(["Intro to Python", "Deep  Learning Basics"]);
        let split = splitter.split_documents(&docs);
        assert_eq!(split, docs);
    }

    #[test]
    fn blank_text_produces_no_chunks() {
        assert!(TextSplitter::default().split_text("   ").is_empty());
    }

    #[test]
    fn long_text_respects_size_and_overlaps() {
        let splitter = TextSplitter::new(40, 15).unwrap();
        let text = (0..30)
            .map(|i| format!("word{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40), "{chunks:?}");
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap();
            assert!(
                pair[1].starts_with(last_word) || pair[1].contains(last_word),
                "expected overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        assert!(chunks[0].starts_with("word00"));
        assert!(chunks.last().unwrap().ends_with("word29"));
    }

    #[test]
    fn paragraphs_split_before_words() {
        let splitter = TextSplitter::new(30, 0).unwrap();
        let text = "first paragraph here\n\nsecond paragraph here";
        assert_eq!(
            splitter.split_text(text),
            vec!["first paragraph here", "second paragraph here"]
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        let chunks = splitter.split_text(&"x".repeat(25));
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert!(chunks.len() >= 3);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
    }

    #[test]
    fn metadata_follows_every_chunk() {
        let splitter = TextSplitter::new(12, 0).unwrap();
        let docs = vec![Document::from_title("alpha beta gamma delta")];
        let split = splitter.split_documents(&docs);
        assert!(split.len() > 1);
        assert!(split.iter().all(|d| d.title() == "alpha beta gamma delta"));
    }
}
