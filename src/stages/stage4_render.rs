use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::io::{PageGeometry, PdfReport, TextReport};
use crate::models::{ReportDocument, DEFAULT_REPORT_TITLE};

/// Configuration for report rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Title printed at the top of the PDF
    pub title: String,
    /// Page size and margins
    pub geometry: PageGeometry,
    /// Whether to generate the PDF report
    pub generate_pdf: bool,
    /// Whether to generate the plain-text report
    pub generate_text: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            geometry: PageGeometry::default(),
            generate_pdf: true,
            generate_text: true,
        }
    }
}

/// Result of rendering
#[derive(Debug, Default)]
pub struct RenderResult {
    /// Path to the PDF report (if generated)
    pub pdf_path: Option<PathBuf>,
    /// Path to the text report (if generated)
    pub text_path: Option<PathBuf>,
    /// Paragraph blocks in the PDF
    pub paragraphs: usize,
    /// Pages in the PDF
    pub pages: usize,
}

/// Execute Stage 4: Rendering
///
/// Produces two output views of the final analysis:
/// 1. PDF report: title plus one paragraph block per non-empty line
/// 2. Text report: the analysis text byte for byte
pub fn execute_render(
    report_text: &str,
    pdf_output: Option<&Path>,
    text_output: Option<&Path>,
    config: &RenderConfig,
) -> Result<RenderResult> {
    let mut result = RenderResult::default();

    if config.generate_pdf {
        if let Some(path) = pdf_output {
            info!("Writing PDF report to {:?}", path);
            let document = ReportDocument::from_text(&config.title, report_text);
            let pdf = PdfReport::from_document(&document, &config.geometry)?;
            pdf.write_file(path)?;
            result.paragraphs = pdf.paragraph_blocks();
            result.pages = pdf.page_count();
            result.pdf_path = Some(path.to_path_buf());
        }
    }

    if config.generate_text {
        if let Some(path) = text_output {
            info!("Writing text report to {:?}", path);
            TextReport::new(report_text).write_file(path)?;
            result.text_path = Some(path.to_path_buf());
        }
    }

    Ok(result)
}
