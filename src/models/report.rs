use serde::{Deserialize, Serialize};

/// Default title printed at the top of the PDF report
pub const DEFAULT_REPORT_TITLE: &str = "FINANCIAL ANALYSIS REPORT";

/// Visual style of a paragraph block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
    /// Markdown heading line (`# ...`) rendered in bold
    Heading,
    /// Regular body text
    Body,
}

/// One paragraph block of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub text: String,
}

/// Structured form of the final report: a title and one block per non-empty line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

impl ReportDocument {
    /// Build the report from free text, one paragraph per non-empty line
    pub fn from_text(title: &str, text: &str) -> Self {
        let paragraphs = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_paragraph)
            .collect();

        Self {
            title: title.to_string(),
            paragraphs,
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }
}

fn parse_paragraph(line: &str) -> Paragraph {
    if line.starts_with('#') {
        let heading = line.trim_start_matches('#').trim();
        if !heading.is_empty() {
            return Paragraph {
                kind: ParagraphKind::Heading,
                text: heading.to_string(),
            };
        }
    }

    Paragraph {
        kind: ParagraphKind::Body,
        text: line.to_string(),
    }
}
