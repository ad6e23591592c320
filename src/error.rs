use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that talks to the inference backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Categorization,
    Analysis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "extraction",
            Stage::Categorization => "categorization",
            Stage::Analysis => "analysis",
        };
        f.write_str(name)
    }
}

/// Every way a statement analysis run can fail
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Statement file not found: {path:?}")]
    InputNotFound { path: PathBuf },

    #[error("Inference backend not reachable at {url}: {reason}")]
    BackendUnreachable { url: String, reason: String },

    #[error("Failed to read statement {path:?}: {source}")]
    DocumentUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF {path:?}: {detail}")]
    PdfParsing { path: PathBuf, detail: String },

    #[error("No text could be extracted from {path:?}")]
    EmptyDocument { path: PathBuf },

    #[error("Statement needs {chunks} chunks but at most {max_chunks} are allowed")]
    DocumentTooLarge { chunks: usize, max_chunks: usize },

    #[error("Inference failed during {stage} stage: {detail}")]
    Inference { stage: Stage, detail: String },

    #[error("Malformed model output in {stage} stage: {detail}")]
    MalformedOutput { stage: Stage, detail: String },

    #[error("Failed to serialize transactions: {0}")]
    Serialization(String),

    #[error("Failed to render report: {0}")]
    Render(String),

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::InputNotFound { .. } => 2,
            AnalysisError::BackendUnreachable { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
