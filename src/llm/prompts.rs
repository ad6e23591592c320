use crate::heuristics::{LedgerSummary, CATEGORY_RULES};
use crate::models::{Category, DocumentChunk};

/// Persona that answers one stage of the pipeline
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

impl AgentProfile {
    /// System prompt derived from the persona
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}\n\
             Answer only with the requested output, without commentary.",
            self.role, self.backstory, self.goal
        )
    }
}

pub const EXTRACTOR: AgentProfile = AgentProfile {
    role: "PDF Transaction Extractor",
    goal: "Extract all transactions from bank statement",
    backstory: "Expert in parsing bank PDFs",
};

pub const CATEGORIZER: AgentProfile = AgentProfile {
    role: "Expense Categorizer",
    goal: "Categorize transactions",
    backstory: "Accountant specializing in categorization",
};

pub const ANALYST: AgentProfile = AgentProfile {
    role: "Financial Analyst",
    goal: "Generate financial report",
    backstory: "Financial analyst expert",
};

/// Amounts are plain decimals so that a comma always separates columns
const CSV_FORMAT_RULE: &str =
    "Never use thousands separators or decimal commas in amounts; quote fields that contain commas.\n";

/// Build the extraction prompt for one chunk of statement text
pub fn build_extraction_prompt(chunk: &DocumentChunk, total_chunks: usize) -> String {
    let mut prompt = String::new();

    if total_chunks > 1 {
        prompt.push_str(&format!(
            "This is part {} of {} of the statement. Extract only the transactions in this part.\n\n",
            chunk.index + 1,
            total_chunks
        ));
    }

    prompt.push_str("Extract ALL transactions from this bank statement:\n\n");
    prompt.push_str(&chunk.text);
    prompt.push_str("\n\nReturn as CSV with columns: date,amount,description\n");
    prompt.push_str("Use a negative amount for money leaving the account.\n");
    prompt.push_str(CSV_FORMAT_RULE);
    prompt.push_str("Example:\n");
    prompt.push_str("10/02,-4.23,POS PURCHASE\n");
    prompt.push_str("10/03,763.01,PREAUTHORIZEDCREDIT");

    prompt
}

/// Build the categorization prompt from the canonical transaction CSV
pub fn build_categorization_prompt(transactions_csv: &str) -> String {
    let mut prompt = String::from("Categorize transactions:\n");

    for (category, keywords) in CATEGORY_RULES {
        prompt.push_str(&format!("- {}: {}\n", category, keywords.join(", ")));
    }
    prompt.push_str(&format!("- {}: anything else\n", Category::Other));
    prompt.push_str("Add 'category' column.\n");
    prompt.push_str("Return as CSV with columns: date,amount,description,category\n");
    prompt.push_str(CSV_FORMAT_RULE);
    prompt.push_str("Keep every row, in the same order.\n\n");

    prompt.push_str("Transactions:\n");
    prompt.push_str(transactions_csv);

    prompt
}

/// Build the analysis prompt from the categorized CSV and the computed totals
pub fn build_analysis_prompt(
    categorized_csv: &str,
    summary: &LedgerSummary,
    language: &str,
) -> String {
    let mut prompt = String::from("Analyze and create report:\n");
    prompt.push_str("1. Total income\n");
    prompt.push_str("2. Total expenses\n");
    prompt.push_str("3. Net balance\n");
    prompt.push_str("4. Top spending categories\n");
    prompt.push_str("5. 3 recommendations\n");
    prompt.push_str(&format!("Write in {}.\n\n", language));

    prompt.push_str("Reference totals computed from the transactions:\n");
    prompt.push_str(&summary.format_for_prompt());
    prompt.push('\n');

    prompt.push_str("Categorized transactions:\n");
    prompt.push_str(categorized_csv);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, text: &str) -> DocumentChunk {
        DocumentChunk {
            chunk_id: format!("chunk_{}", index),
            index,
            start_char: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_system_prompt_uses_persona() {
        let system = EXTRACTOR.system_prompt();
        assert!(system.contains("PDF Transaction Extractor"));
        assert!(system.contains("Extract all transactions from bank statement"));
    }

    #[test]
    fn test_extraction_prompt_embeds_chunk() {
        let prompt = build_extraction_prompt(&chunk(0, "10/02 POS PURCHASE 4.23"), 1);
        assert!(prompt.contains("10/02 POS PURCHASE 4.23"));
        assert!(prompt.contains("date,amount,description"));
        assert!(prompt.contains("Never use thousands separators"));
        assert!(!prompt.contains("part 1 of"));

        let prompt = build_extraction_prompt(&chunk(1, "..."), 3);
        assert!(prompt.contains("part 2 of 3"));
    }

    #[test]
    fn test_categorization_prompt_lists_rules() {
        let prompt = build_categorization_prompt("date,amount,description\n");
        assert!(prompt.contains("- INCOME: PREAUTHORIZEDCREDIT, PAYROLL, INTEREST"));
        assert!(prompt.contains("- FEES: SERVICE CHARGE"));
        assert!(prompt.contains("- OTHER: anything else"));
        assert!(prompt.contains("quote fields that contain commas"));
        assert!(prompt.ends_with("date,amount,description\n"));
    }

    #[test]
    fn test_analysis_prompt_language() {
        let prompt = build_analysis_prompt("csv", &LedgerSummary::default(), "French");
        assert!(prompt.contains("Write in French."));
        assert!(prompt.contains("3 recommendations"));
    }
}
