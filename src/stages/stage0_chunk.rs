use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::models::{ChunkConfig, ChunkSet, DocumentChunk, StatementDocument};

/// Perform Stage 0: split the document text into extraction chunks
///
/// This stage:
/// 1. Joins the page texts
/// 2. Cuts them into chunks of at most `max_chunk_chars`, on line boundaries when possible
/// 3. Refuses documents that would need more than `max_chunks` chunks
///
/// The chunks concatenate back to the full text; nothing is dropped.
pub fn chunk_document(document: &StatementDocument, config: &ChunkConfig) -> Result<ChunkSet> {
    if config.max_chunk_chars == 0 {
        return Err(AnalysisError::InvalidConfig(
            "chunk size must be at least one character".to_string(),
        ));
    }

    let pieces = split_text(&document.text(), config.max_chunk_chars);
    if pieces.len() > config.max_chunks {
        return Err(AnalysisError::DocumentTooLarge {
            chunks: pieces.len(),
            max_chunks: config.max_chunks,
        });
    }

    let mut chunks = Vec::with_capacity(pieces.len());
    let mut start_char = 0;
    for (index, text) in pieces.into_iter().enumerate() {
        let len = text.chars().count();
        chunks.push(DocumentChunk {
            chunk_id: format!("chunk_{}", index),
            index,
            start_char,
            text,
        });
        start_char += len;
    }

    debug!(
        "Split {} characters into {} chunks",
        start_char,
        chunks.len()
    );

    Ok(ChunkSet { chunks })
}

/// Split text into pieces of at most `max_chars` characters
///
/// Lines are kept whole unless a single line is longer than the limit, in
/// which case it is cut at character boundaries.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if current_len > 0 {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(max_chars) {
            if piece.len() == max_chars {
                pieces.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if current_len > 0 {
        pieces.push(current);
    }

    pieces
}
