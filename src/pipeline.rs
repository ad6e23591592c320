//! End-to-end run: input check, connectivity probe, reading, the three
//! prompt stages and rendering, strictly in that order.

use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::heuristics::LedgerSummary;
use crate::io::read_statement;
use crate::llm::{BackendError, InferenceBackend};
use crate::models::ChunkConfig;
use crate::stages::{
    chunk_document, execute_render, execute_stage1, execute_stage2, execute_stage3,
    RenderConfig, RenderResult, Stage1Config, Stage2Config, Stage3Config,
};

/// Characters of document text shown in the progress log
const PREVIEW_CHARS: usize = 300;

/// Everything a run needs, passed explicitly from the entry point
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Statement PDF to analyze
    pub input: PathBuf,
    /// Where the PDF report is written
    pub pdf_output: PathBuf,
    /// Where the text report is written
    pub text_output: PathBuf,
    pub chunking: ChunkConfig,
    pub extraction: Stage1Config,
    pub categorization: Stage2Config,
    pub analysis: Stage3Config,
    pub render: RenderConfig,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("dummy_statement.pdf"),
            pdf_output: PathBuf::from("financial_report.pdf"),
            text_output: PathBuf::from("financial_report.txt"),
            chunking: ChunkConfig::default(),
            extraction: Stage1Config::default(),
            categorization: Stage2Config::default(),
            analysis: Stage3Config::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AnalysisOptions {
    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_chars == 0 {
            return Err(AnalysisError::InvalidConfig(
                "--chunk-chars must be greater than zero".to_string(),
            ));
        }
        if self.chunking.max_chunks == 0 {
            return Err(AnalysisError::InvalidConfig(
                "--max-chunks must be greater than zero".to_string(),
            ));
        }
        if self.analysis.language.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "--language must not be empty".to_string(),
            ));
        }
        if normalize_path(&self.pdf_output) == normalize_path(&self.text_output) {
            return Err(AnalysisError::InvalidConfig(
                "PDF and text reports must be written to different files".to_string(),
            ));
        }
        Ok(())
    }
}

/// Absolute form of `path` without `.` components, for comparing output targets
fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Summary of a completed run
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Final report text, as written to the text file
    pub report: String,
    pub pages_read: usize,
    pub chunks: usize,
    pub transactions: usize,
    /// Rows where the model's category contradicted the keyword rules
    pub category_disagreements: usize,
    pub summary: LedgerSummary,
    pub render: RenderResult,
}

/// Run the whole analysis against the given backend
///
/// A missing input fails before any network traffic; an unreachable backend
/// fails before the document is read.
pub async fn run_analysis<B: InferenceBackend + ?Sized>(
    backend: &B,
    options: &AnalysisOptions,
) -> Result<AnalysisOutcome> {
    options.validate()?;

    if !options.input.exists() {
        return Err(AnalysisError::InputNotFound {
            path: options.input.clone(),
        });
    }

    info!("Checking inference backend...");
    backend.probe().await.map_err(|e| match e {
        BackendError::Unreachable { url, reason } => {
            AnalysisError::BackendUnreachable { url, reason }
        }
        other => AnalysisError::BackendUnreachable {
            url: "inference backend".to_string(),
            reason: other.to_string(),
        },
    })?;
    info!("Inference backend is running");

    info!("Reading statement from {:?}", options.input);
    let document = read_statement(&options.input)?;
    info!(
        "Statement: {} pages, {} characters",
        document.page_count(),
        document.char_count()
    );
    info!("Preview: {}...", document.preview(PREVIEW_CHARS));

    let chunks = chunk_document(&document, &options.chunking)?;
    info!("Stage 0: {} chunks", chunks.total_chunks());

    let stage1 = execute_stage1(backend, &chunks, &options.extraction).await?;
    info!("Stage 1: {} transactions extracted", stage1.transactions.len());

    let stage2 = execute_stage2(backend, &stage1.transactions, &options.categorization).await?;

    let stage3 = execute_stage3(backend, &stage2.transactions, &options.analysis).await?;

    let render = execute_render(
        &stage3.report,
        Some(&options.pdf_output),
        Some(&options.text_output),
        &options.render,
    )?;

    Ok(AnalysisOutcome {
        pages_read: document.page_count(),
        chunks: chunks.total_chunks(),
        transactions: stage2.transactions.len(),
        category_disagreements: stage2.check.disagreements.len(),
        summary: stage3.summary,
        report: stage3.report,
        render,
    })
}
