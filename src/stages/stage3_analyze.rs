use tracing::info;

use crate::error::{Result, Stage};
use crate::heuristics::LedgerSummary;
use crate::llm::{build_analysis_prompt, validate_report, InferenceBackend, ANALYST};
use crate::models::{categorized_to_csv, CategorizedTransaction};

use super::attempt::complete_validated;

/// Configuration for Stage 3
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Language the report is written in
    pub language: String,
    /// Maximum retries on an empty answer or request failure
    pub max_retries: u32,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            language: "French".to_string(),
            max_retries: 1,
        }
    }
}

/// Result of Stage 3 processing
#[derive(Debug)]
pub struct Stage3Result {
    /// Narrative report text, exactly as returned by the model
    pub report: String,
    /// Totals computed locally and given to the model as reference
    pub summary: LedgerSummary,
}

/// Execute Stage 3: narrative analysis
pub async fn execute_stage3<B: InferenceBackend + ?Sized>(
    backend: &B,
    transactions: &[CategorizedTransaction],
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let summary = LedgerSummary::from_transactions(transactions);
    info!(
        "Stage 3: Analyzing (income {:.2}, expenses {:.2}, net {:.2})",
        summary.total_income,
        summary.total_expenses,
        summary.net_balance()
    );

    let prompt = build_analysis_prompt(
        &categorized_to_csv(transactions)?,
        &summary,
        &config.language,
    );

    let report = complete_validated(
        backend,
        Stage::Analysis,
        "Analysis",
        &ANALYST.system_prompt(),
        &prompt,
        config.max_retries,
        |raw| validate_report(raw).map(|_| raw.to_string()),
    )
    .await?;

    Ok(Stage3Result { report, summary })
}
