use std::collections::BTreeMap;

use crate::models::{format_amount, CategorizedTransaction, Category};

/// Totals computed locally from the categorized transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    pub transaction_count: usize,
    /// Sum of positive amounts
    pub total_income: f64,
    /// Sum of negative amounts, as a positive number
    pub total_expenses: f64,
    /// Outgoing money per category, largest first
    pub spending_by_category: Vec<(Category, f64)>,
}

impl LedgerSummary {
    pub fn from_transactions(rows: &[CategorizedTransaction]) -> Self {
        let mut total_income = 0.0;
        let mut total_expenses = 0.0;
        let mut spending: BTreeMap<Category, f64> = BTreeMap::new();

        for row in rows {
            let amount = row.transaction.amount;
            if amount > 0.0 {
                total_income += amount;
            } else if amount < 0.0 {
                total_expenses += -amount;
                *spending.entry(row.category).or_insert(0.0) += -amount;
            }
        }

        let mut spending_by_category: Vec<(Category, f64)> = spending.into_iter().collect();
        spending_by_category.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Self {
            transaction_count: rows.len(),
            total_income,
            total_expenses,
            spending_by_category,
        }
    }

    pub fn net_balance(&self) -> f64 {
        self.total_income - self.total_expenses
    }

    /// The `n` categories with the most outgoing money
    pub fn top_categories(&self, n: usize) -> &[(Category, f64)] {
        &self.spending_by_category[..n.min(self.spending_by_category.len())]
    }

    pub fn format_for_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("- Transactions: {}\n", self.transaction_count));
        out.push_str(&format!("- Total income: {}\n", format_amount(self.total_income)));
        out.push_str(&format!(
            "- Total expenses: {}\n",
            format_amount(self.total_expenses)
        ));
        out.push_str(&format!("- Net balance: {}\n", format_amount(self.net_balance())));
        for (category, amount) in &self.spending_by_category {
            out.push_str(&format!("- Spent on {}: {}\n", category, format_amount(*amount)));
        }
        out
    }
}
