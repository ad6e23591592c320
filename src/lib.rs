pub mod error;
pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::{AnalysisError, Result, Stage};
pub use heuristics::{check_categories, suggest_category, LedgerSummary};
pub use io::{read_statement, PageGeometry, PdfReport, TextReport};
pub use llm::{BackendError, InferenceBackend, OllamaClient, OllamaConfig};
pub use models::{
    Category, CategorizedTransaction, ChunkConfig, ReportDocument, StatementDocument, Transaction,
};
pub use pipeline::{run_analysis, AnalysisOptions, AnalysisOutcome};
pub use stages::{
    chunk_document, execute_render, execute_stage1, execute_stage2, execute_stage3,
    RenderConfig, Stage1Config, Stage2Config, Stage3Config,
};
