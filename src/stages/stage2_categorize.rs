use tracing::{info, warn};

use crate::error::{Result, Stage};
use crate::heuristics::{check_categories, suggest_category, CategoryCheck};
use crate::llm::{
    build_categorization_prompt, validate_categorization, InferenceBackend, CATEGORIZER,
};
use crate::models::{transactions_to_csv, CategorizedTransaction, Transaction};

use super::attempt::complete_validated;

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct Stage2Config {
    /// Maximum retries on validation or request failure
    pub max_retries: u32,
}

impl Default for Stage2Config {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

/// Result of Stage 2 processing
#[derive(Debug)]
pub struct Stage2Result {
    /// Every extracted transaction with its category
    pub transactions: Vec<CategorizedTransaction>,
    /// Comparison of the model's categories with the keyword rules
    pub check: CategoryCheck,
}

/// Execute Stage 2: categorization
///
/// The canonical CSV of the extracted rows goes to the model together with
/// the category rules. The answer must contain every row with a known
/// category. Rows where the model contradicts a keyword rule are kept as the
/// model answered but logged.
pub async fn execute_stage2<B: InferenceBackend + ?Sized>(
    backend: &B,
    transactions: &[Transaction],
    config: &Stage2Config,
) -> Result<Stage2Result> {
    info!("Stage 2: Categorizing {} transactions", transactions.len());

    let prompt = build_categorization_prompt(&transactions_to_csv(transactions)?);
    let expected = transactions.len();

    let categorized = complete_validated(
        backend,
        Stage::Categorization,
        "Categorization",
        &CATEGORIZER.system_prompt(),
        &prompt,
        config.max_retries,
        |raw| validate_categorization(raw, expected).into_result(),
    )
    .await?;

    let check = check_categories(&categorized);
    for &i in &check.disagreements {
        let row = &categorized[i];
        warn!(
            "Row {} ({}): model chose {}, rules suggest {}",
            i + 1,
            row.transaction.description,
            row.category,
            suggest_category(&row.transaction.description)
                .map(|c| c.to_string())
                .unwrap_or_default()
        );
    }

    info!(
        "Stage 2: {} rows agree with keyword rules, {} disagree, {} uncovered",
        check.agreements,
        check.disagreements.len(),
        check.unmatched
    );

    Ok(Stage2Result {
        transactions: categorized,
        check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::llm::testing::ScriptedBackend;
    use crate::models::Category;

    fn extracted() -> Vec<Transaction> {
        vec![
            Transaction {
                date: "10/02".to_string(),
                amount: -4.23,
                description: "POS PURCHASE".to_string(),
            },
            Transaction {
                date: "10/05".to_string(),
                amount: -60.0,
                description: "ATM WITHDRAWAL".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_categorizes_and_checks_rules() {
        let backend = ScriptedBackend::new(&[
            "date,amount,description,category\n10/02,-4.23,POS PURCHASE,SHOPPING\n10/05,-60.00,ATM WITHDRAWAL,BILLS",
        ]);

        let result = execute_stage2(&backend, &extracted(), &Stage2Config::default())
            .await
            .unwrap();

        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.transactions[1].category, Category::Bills);
        assert_eq!(result.check.agreements, 1);
        assert_eq!(result.check.disagreements, vec![1]);

        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("10/05,-60.00,ATM WITHDRAWAL"));
    }

    #[tokio::test]
    async fn test_missing_rows_fail_after_retry() {
        let backend = ScriptedBackend::new(&[
            "10/02,-4.23,POS PURCHASE,SHOPPING",
            "10/02,-4.23,POS PURCHASE,SHOPPING",
        ]);

        let err = execute_stage2(&backend, &extracted(), &Stage2Config::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::MalformedOutput {
                stage: Stage::Categorization,
                ..
            }
        ));
        assert_eq!(backend.completions(), 2);
    }
}
