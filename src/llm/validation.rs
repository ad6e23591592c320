use chrono::NaiveDate;

use crate::models::{CategorizedTransaction, Category, Transaction};

/// Result of checking one stage's raw output against its expected shape
#[derive(Debug, Clone)]
pub struct OutputValidation<T> {
    /// Whether the output can be passed on
    pub is_valid: bool,
    /// Rows parsed from the output
    pub rows: Vec<T>,
    /// List of validation errors
    pub errors: Vec<String>,
    /// Prose lines ignored while looking for CSV rows
    pub skipped_lines: usize,
}

impl<T> OutputValidation<T> {
    fn finish(rows: Vec<T>, errors: Vec<String>, skipped_lines: usize) -> Self {
        Self {
            is_valid: errors.is_empty(),
            rows,
            errors,
            skipped_lines,
        }
    }

    /// Parsed rows, or all errors joined into one message
    pub fn into_result(self) -> Result<Vec<T>, String> {
        if self.is_valid {
            Ok(self.rows)
        } else {
            Err(self.errors.join("; "))
        }
    }
}

/// Validate extraction output: CSV rows of `date,amount,description`
///
/// Code fences, header rows and prose lines without commas are ignored. An
/// output without any rows is valid here; a chunk may hold no transactions.
pub fn validate_extraction(raw: &str) -> OutputValidation<Transaction> {
    let (lines, skipped) = candidate_lines(raw);
    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (line_no, line) in lines {
        match split_record(line).and_then(|fields| parse_transaction(&fields)) {
            Ok(tx) => rows.push(tx),
            Err(e) => errors.push(format!("line {}: {}", line_no, e)),
        }
    }

    OutputValidation::finish(rows, errors, skipped)
}

/// Validate categorization output: CSV rows of `date,amount,description,category`
///
/// Every extracted row must come back, so the row count has to match.
pub fn validate_categorization(
    raw: &str,
    expected_rows: usize,
) -> OutputValidation<CategorizedTransaction> {
    let (lines, skipped) = candidate_lines(raw);
    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (line_no, line) in lines {
        let parsed = split_record(line).and_then(|fields| {
            if fields.len() < 4 {
                return Err(format!("expected 4 columns, found {}", fields.len()));
            }
            let (category_field, rest) = fields.split_last().ok_or("empty row")?;
            let category = Category::parse(category_field)
                .ok_or_else(|| format!("unknown category '{}'", category_field))?;
            let transaction = parse_transaction(rest)?;
            Ok(CategorizedTransaction {
                transaction,
                category,
            })
        });

        match parsed {
            Ok(row) => rows.push(row),
            Err(e) => errors.push(format!("line {}: {}", line_no, e)),
        }
    }

    if errors.is_empty() && rows.len() != expected_rows {
        errors.push(format!(
            "expected {} categorized rows, found {}",
            expected_rows,
            rows.len()
        ));
    }

    OutputValidation::finish(rows, errors, skipped)
}

/// Validate the analysis text: anything non-blank is accepted
pub fn validate_report(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        Err("analysis is empty".to_string())
    } else {
        Ok(())
    }
}

/// Lines that look like CSV data rows, with their 1-based line numbers
fn candidate_lines(raw: &str) -> (Vec<(usize, &str)>, usize) {
    let mut lines = Vec::new();
    let mut skipped = 0;

    for (i, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }
        if !line.contains(',') {
            skipped += 1;
            continue;
        }
        if is_header(line) {
            continue;
        }
        lines.push((i + 1, line));
    }

    (lines, skipped)
}

fn is_header(line: &str) -> bool {
    line.split(',')
        .next()
        .map(|f| f.trim().trim_matches('"').eq_ignore_ascii_case("date"))
        .unwrap_or(false)
}

fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(e)) => Err(format!("invalid CSV: {}", e)),
        None => Err("empty row".to_string()),
    }
}

/// Parse `date, amount, description...`; extra columns belong to the description
fn parse_transaction(fields: &[String]) -> Result<Transaction, String> {
    if fields.len() < 3 {
        return Err(format!("expected 3 columns, found {}", fields.len()));
    }

    let date = fields[0].trim().to_string();
    if !is_valid_date(&date) {
        return Err(format!("invalid date '{}'", date));
    }

    if is_split_amount(fields) {
        return Err(format!(
            "ambiguous amount '{},{}'; quote descriptions containing commas",
            fields[1].trim(),
            fields[2].trim()
        ));
    }

    let amount = parse_amount(&fields[1])?;

    let description = fields[2..].join(", ").trim().to_string();
    if description.is_empty() {
        return Err("empty description".to_string());
    }

    Ok(Transaction {
        date,
        amount,
        description,
    })
}

/// An unquoted `1,234.56` or `-4,23` lands in two fields: a whole-number
/// amount followed by a field of two or three digits.
fn is_split_amount(fields: &[String]) -> bool {
    if fields.len() <= 3 {
        return false;
    }

    let whole = fields[1].trim();
    let tail = fields[2].trim();
    let (tail_int, tail_frac) = tail.split_once('.').unwrap_or((tail, "0"));

    whole.chars().last().is_some_and(|c| c.is_ascii_digit())
        && !whole.contains('.')
        && (2..=3).contains(&tail_int.len())
        && tail_int.chars().all(|c| c.is_ascii_digit())
        && !tail_frac.is_empty()
        && tail_frac.chars().all(|c| c.is_ascii_digit())
}

/// Parse a signed amount, tolerating currency symbols and accounting parentheses
pub fn parse_amount(field: &str) -> Result<f64, String> {
    let cleaned: String = field
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ' ' | '\u{a0}'))
        .collect();

    let (negative, digits) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };

    let value: f64 = digits
        .strip_prefix('+')
        .unwrap_or(digits)
        .parse()
        .map_err(|_| format!("invalid amount '{}'", field.trim()))?;

    if !value.is_finite() {
        return Err(format!("invalid amount '{}'", field.trim()));
    }

    Ok(if negative { -value.abs() } else { value })
}

/// Accept full dates and the month/day forms bank statements print
pub fn is_valid_date(date: &str) -> bool {
    const FULL: [&str; 4] = ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d", "%d/%m/%Y"];

    if FULL
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(date, fmt).is_ok())
    {
        return true;
    }

    // Leap year so that 02/29 is accepted
    let with_year = format!("{}/2000", date);
    ["%m/%d/%Y", "%d/%m/%Y"]
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(&with_year, fmt).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_extraction_with_noise() {
        let raw = "Here are the transactions:\n```csv\ndate,amount,description\n10/02,-4.23,POS PURCHASE\n10/03,763.01,PREAUTHORIZEDCREDIT\n```\n";
        let result = validate_extraction(raw);

        assert!(result.is_valid);
        assert_eq!(result.skipped_lines, 1);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].date, "10/02");
        assert_eq!(result.rows[0].amount, -4.23);
        assert_eq!(result.rows[1].description, "PREAUTHORIZEDCREDIT");
    }

    #[test]
    fn test_extraction_description_with_commas() {
        let result = validate_extraction("10/05,-12.00,CHECK 104, RENT\n10/06,-3.00,\"FEE, MONTHLY\"");
        let rows = result.into_result().unwrap();

        assert_eq!(rows[0].description, "CHECK 104, RENT");
        assert_eq!(rows[1].description, "FEE, MONTHLY");
    }

    #[test]
    fn test_comma_in_amount_is_rejected() {
        let result = validate_extraction("10/03,1,234.56,PAYROLL DEPOSIT");
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("ambiguous amount '1,234.56'"));

        let result = validate_extraction("10/02,-4,23,POS PURCHASE");
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("ambiguous amount '-4,23'"));

        let result = validate_categorization("10/03,1,234.56,PAYROLL DEPOSIT,INCOME", 1);
        assert!(!result.is_valid);
        assert!(result.rows.is_empty());

        // Quoted amounts and descriptions starting with digits stay accepted
        let rows = validate_extraction("10/03,\"1234.56\",PAYROLL DEPOSIT\n10/05,-12.00,104, MAIN ST")
            .into_result()
            .unwrap();
        assert_eq!(rows[0].amount, 1234.56);
        assert_eq!(rows[1].description, "104, MAIN ST");
    }

    #[test]
    fn test_extraction_reports_bad_rows() {
        let result = validate_extraction("10/02,-4.23,POS PURCHASE\n13/45,abc,ATM\n10/04,5.00");

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("line 2: invalid date '13/45'"));
        assert!(result.errors[1].contains("expected 3 columns"));
    }

    #[test]
    fn test_extraction_without_rows_is_valid() {
        let result = validate_extraction("No transactions found in this section.");
        assert!(result.is_valid);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_validate_categorization() {
        let raw = "date,amount,description,category\n10/02,-4.23,POS PURCHASE,SHOPPING\n10/03,763.01,PREAUTHORIZEDCREDIT,income\n";
        let result = validate_categorization(raw, 2);

        assert!(result.is_valid);
        assert_eq!(result.rows[0].category, Category::Shopping);
        assert_eq!(result.rows[1].category, Category::Income);
        assert_eq!(result.rows[1].transaction.amount, 763.01);
    }

    #[test]
    fn test_categorization_rejects_unknown_category_and_count() {
        let result = validate_categorization("10/02,-4.23,POS PURCHASE,GROCERIES", 1);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("unknown category 'GROCERIES'"));

        let result = validate_categorization("10/02,-4.23,POS PURCHASE,SHOPPING", 2);
        let err = result.into_result().unwrap_err();
        assert_eq!(err, "expected 2 categorized rows, found 1");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-4.23"), Ok(-4.23));
        assert_eq!(parse_amount("+763.01"), Ok(763.01));
        assert_eq!(parse_amount("$ 12.50"), Ok(12.5));
        assert_eq!(parse_amount("(60.00)"), Ok(-60.0));
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn test_is_valid_date() {
        assert!(is_valid_date("10/02"));
        assert!(is_valid_date("25/10"));
        assert!(is_valid_date("02/29"));
        assert!(is_valid_date("10/02/2024"));
        assert!(is_valid_date("2024-10-02"));
        assert!(!is_valid_date("13/45"));
        assert!(!is_valid_date("yesterday"));
    }

    #[test]
    fn test_validate_report() {
        assert!(validate_report("Revenus totaux: 763,01").is_ok());
        assert!(validate_report("  \n").is_err());
    }
}
