use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Spending category assigned during categorization - restricted set to reduce hallucination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Salary, transfers in, interest
    Income,
    /// Card purchases
    Shopping,
    /// Checks and recurring bills
    Bills,
    /// ATM withdrawals
    Cash,
    /// Bank service charges
    Fees,
    /// Anything the rules do not cover
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Income,
        Category::Shopping,
        Category::Bills,
        Category::Cash,
        Category::Fees,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "INCOME",
            Category::Shopping => "SHOPPING",
            Category::Bills => "BILLS",
            Category::Cash => "CASH",
            Category::Fees => "FEES",
            Category::Other => "OTHER",
        }
    }

    /// Parse a category label as written by the model (case and quotes ignored)
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '*');
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single statement line as extracted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date as printed on the statement (validated, not reformatted)
    pub date: String,
    /// Signed amount; negative is money out
    pub amount: f64,
    /// Statement description
    pub description: String,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }
}

/// An extracted transaction with its assigned category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Category,
}

/// Canonical CSV of extracted transactions, as fed to the categorization prompt
pub fn transactions_to_csv(transactions: &[Transaction]) -> Result<String> {
    write_csv(
        &["date", "amount", "description"],
        transactions.iter().map(|t| {
            vec![
                t.date.clone(),
                format_amount(t.amount),
                t.description.clone(),
            ]
        }),
    )
}

/// Canonical CSV of categorized transactions, as fed to the analysis prompt
pub fn categorized_to_csv(rows: &[CategorizedTransaction]) -> Result<String> {
    write_csv(
        &["date", "amount", "description", "category"],
        rows.iter().map(|r| {
            vec![
                r.transaction.date.clone(),
                format_amount(r.transaction.amount),
                r.transaction.description.clone(),
                r.category.to_string(),
            ]
        }),
    )
}

/// Format an amount with two decimals
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn write_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Result<String> {
    let bytes = write_records(Vec::new(), header, rows)?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::Serialization(e.to_string()))
}

fn write_records<W: std::io::Write>(
    out: W,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<W> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| AnalysisError::Serialization(e.to_string()))
}

fn csv_error(e: csv::Error) -> AnalysisError {
    AnalysisError::Serialization(e.to_string())
}
