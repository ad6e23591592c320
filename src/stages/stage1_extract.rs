use tracing::{debug, info};

use crate::error::{AnalysisError, Result, Stage};
use crate::llm::{build_extraction_prompt, validate_extraction, InferenceBackend, EXTRACTOR};
use crate::models::{ChunkSet, Transaction};

use super::attempt::complete_validated;

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct Stage1Config {
    /// Maximum retries per chunk on validation or request failure
    pub max_retries: u32,
}

impl Default for Stage1Config {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

/// Result of Stage 1 processing
#[derive(Debug)]
pub struct Stage1Result {
    /// Transactions from all chunks, in document order
    pub transactions: Vec<Transaction>,
    /// Number of chunks sent to the model
    pub chunks_processed: usize,
    /// Number of blank chunks skipped
    pub chunks_skipped: usize,
}

/// Execute Stage 1: transaction extraction
///
/// For each chunk with text:
/// 1. Build the extraction prompt
/// 2. Ask the model for `date,amount,description` CSV
/// 3. Validate the rows, retrying on malformed output
/// 4. Append the rows to the aggregate
pub async fn execute_stage1<B: InferenceBackend + ?Sized>(
    backend: &B,
    chunks: &ChunkSet,
    config: &Stage1Config,
) -> Result<Stage1Result> {
    let system = EXTRACTOR.system_prompt();
    let mut transactions = Vec::new();
    let mut chunks_processed = 0;

    let chunks_skipped = chunks.total_chunks() - chunks.extractable_count();
    info!(
        "Stage 1: Extracting from {} chunks ({} blank skipped)",
        chunks.extractable_count(),
        chunks_skipped
    );

    for chunk in chunks.extractable() {
        let prompt = build_extraction_prompt(chunk, chunks.total_chunks());
        let label = format!("Chunk {}", chunk.chunk_id);

        let rows = complete_validated(
            backend,
            Stage::Extraction,
            &label,
            &system,
            &prompt,
            config.max_retries,
            |raw| validate_extraction(raw).into_result(),
        )
        .await?;

        if rows.is_empty() {
            debug!("{}: no transactions", label);
        } else {
            info!("{}: {} transactions", label, rows.len());
        }

        transactions.extend(rows);
        chunks_processed += 1;
    }

    if transactions.is_empty() {
        return Err(AnalysisError::MalformedOutput {
            stage: Stage::Extraction,
            detail: "no transactions found in the statement".to_string(),
        });
    }

    Ok(Stage1Result {
        transactions,
        chunks_processed,
        chunks_skipped,
    })
}
