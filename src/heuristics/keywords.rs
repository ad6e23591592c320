use crate::models::{CategorizedTransaction, Category};

/// Statement keywords that identify each category
///
/// Shared by the categorization prompt and the local cross-check so both
/// follow the same rules.
pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Income,
        &["PREAUTHORIZEDCREDIT", "PAYROLL", "INTEREST"],
    ),
    (Category::Shopping, &["POS PURCHASE"]),
    (Category::Bills, &["CHECK"]),
    (Category::Cash, &["ATM"]),
    (Category::Fees, &["SERVICE CHARGE"]),
];

/// Suggest a category from the description keywords, if any rule matches
pub fn suggest_category(description: &str) -> Option<Category> {
    let upper = description.to_uppercase();
    let compact: String = upper.chars().filter(|c| !c.is_whitespace()).collect();

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|k| {
                let k_compact: String = k.chars().filter(|c| !c.is_whitespace()).collect();
                upper.contains(k) || compact.contains(&k_compact)
            })
        })
        .map(|(category, _)| *category)
}

/// Outcome of comparing model categories against the keyword rules
#[derive(Debug, Clone, Default)]
pub struct CategoryCheck {
    /// Rows where a rule matched and agreed with the model
    pub agreements: usize,
    /// Row indices where a rule matched but the model chose differently
    pub disagreements: Vec<usize>,
    /// Rows no rule covers
    pub unmatched: usize,
}

/// Compare each row's category with the keyword rules
pub fn check_categories(rows: &[CategorizedTransaction]) -> CategoryCheck {
    let mut check = CategoryCheck::default();

    for (i, row) in rows.iter().enumerate() {
        match suggest_category(&row.transaction.description) {
            Some(expected) if expected == row.category => check.agreements += 1,
            Some(_) => check.disagreements.push(i),
            None => check.unmatched += 1,
        }
    }

    check
}
