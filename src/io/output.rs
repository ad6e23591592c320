use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::io::pdf::{encode_pdf, layout_report, PageGeometry, ReportLayout};
use crate::models::ReportDocument;

/// Plain-text report: the analysis text exactly as the model produced it
pub struct TextReport<'a> {
    text: &'a str,
}

impl<'a> TextReport<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Write to a text file, replacing any previous version
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.text.as_bytes()).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Paginated PDF report
#[derive(Debug, Clone)]
pub struct PdfReport {
    pub layout: ReportLayout,
    pub bytes: Vec<u8>,
}

impl PdfReport {
    /// Lay out and encode a report document
    pub fn from_document(report: &ReportDocument, geometry: &PageGeometry) -> Result<Self> {
        let layout = layout_report(report, geometry);
        let bytes = encode_pdf(&layout, geometry)?;
        Ok(Self { layout, bytes })
    }

    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    pub fn paragraph_blocks(&self) -> usize {
        self.layout.paragraph_blocks()
    }

    /// Write to a PDF file, replacing any previous version
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
