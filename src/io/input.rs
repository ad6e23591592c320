use std::path::Path;

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::models::StatementDocument;

pub use crate::models::join_pages;

/// Read a statement PDF into per-page text
///
/// Every failure is reported as a typed error; error text never ends up in
/// the returned document.
pub fn read_statement(path: &Path) -> Result<StatementDocument> {
    if !path.exists() {
        return Err(AnalysisError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| AnalysisError::DocumentUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = extract_pages(&bytes).map_err(|detail| AnalysisError::PdfParsing {
        path: path.to_path_buf(),
        detail,
    })?;
    debug!("Extracted {} pages from {:?}", pages.len(), path);

    let document = StatementDocument::new(path, pages);
    if document.is_blank() {
        return Err(AnalysisError::EmptyDocument {
            path: path.to_path_buf(),
        });
    }

    Ok(document)
}

/// Extract the text of every page of an in-memory PDF
pub fn extract_pages(pdf_bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    // pdf-extract panics on some malformed font tables instead of returning an error
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("PDF text extraction panicked".to_string()),
    }
}
