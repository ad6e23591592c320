use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Text extracted from a statement PDF, one entry per page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementDocument {
    /// File the text was read from
    pub source: PathBuf,
    /// Extracted text of every page, in page order
    pub pages: Vec<String>,
}

impl StatementDocument {
    pub fn new(source: impl Into<PathBuf>, pages: Vec<String>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Full document text with pages joined by newlines
    pub fn text(&self) -> String {
        join_pages(&self.pages)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Character count of the joined text
    pub fn char_count(&self) -> usize {
        let separators = self.pages.len().saturating_sub(1);
        self.pages.iter().map(|p| p.chars().count()).sum::<usize>() + separators
    }

    /// True when no page carries any visible text
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }

    /// First `max_chars` characters of the text, for console previews
    pub fn preview(&self, max_chars: usize) -> String {
        self.text().chars().take(max_chars).collect()
    }
}

/// Concatenate page texts with a single `\n` between consecutive pages
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}

/// Configuration for splitting a document into extraction chunks
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters submitted to a single extraction prompt
    pub max_chunk_chars: usize,
    /// Documents needing more chunks than this are refused
    pub max_chunks: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 2_000,
            max_chunks: 16,
        }
    }
}

/// A bounded slice of the document text sent to the extraction stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Identifier used in logs and prompts
    pub chunk_id: String,
    /// Position of this chunk in the document
    pub index: usize,
    /// Character offset of the chunk start within the joined text
    pub start_char: usize,
    /// Chunk text, verbatim
    pub text: String,
}

impl DocumentChunk {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whitespace-only chunks carry nothing to extract
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Ordered, non-overlapping chunks covering the whole document
#[derive(Debug, Clone, Default)]
pub struct ChunkSet {
    pub chunks: Vec<DocumentChunk>,
}

impl ChunkSet {
    /// Chunks that contain text worth sending to the model
    pub fn extractable(&self) -> impl Iterator<Item = &DocumentChunk> {
        self.chunks.iter().filter(|c| !c.is_blank())
    }

    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn extractable_count(&self) -> usize {
        self.extractable().count()
    }

    /// Reassemble the full document text
    pub fn joined(&self) -> String {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_length() {
        let pages = vec![
            "Page one text".to_string(),
            "Second page".to_string(),
            "3".to_string(),
        ];
        let joined = join_pages(&pages);

        let expected = pages.iter().map(|p| p.len()).sum::<usize>() + pages.len() - 1;
        assert_eq!(joined.len(), expected);
        assert_eq!(joined, "Page one text\nSecond page\n3");
    }

    #[test]
    fn test_char_count_matches_text() {
        let doc = StatementDocument::new(
            "statement.pdf",
            vec!["Relevé de compte".to_string(), "Solde: 12,50 €".to_string()],
        );
        assert_eq!(doc.char_count(), doc.text().chars().count());
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_blank_document() {
        let doc = StatementDocument::new("scan.pdf", vec!["  \n".to_string(), String::new()]);
        assert!(doc.is_blank());
        assert_eq!(doc.preview(10), "  \n\n");
    }

    #[test]
    fn test_chunk_set_skips_blank_chunks() {
        let set = ChunkSet {
            chunks: vec![
                DocumentChunk {
                    chunk_id: "chunk_0".to_string(),
                    index: 0,
                    start_char: 0,
                    text: "10/02 POS PURCHASE -4.23\n".to_string(),
                },
                DocumentChunk {
                    chunk_id: "chunk_1".to_string(),
                    index: 1,
                    start_char: 25,
                    text: "\n\n".to_string(),
                },
            ],
        };

        assert_eq!(set.total_chunks(), 2);
        assert_eq!(set.extractable_count(), 1);
        assert_eq!(set.joined(), "10/02 POS PURCHASE -4.23\n\n\n");
    }
}
