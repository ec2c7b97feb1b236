//! PDF text extraction.

use crate::error::{RecapError, Result};
use std::path::Path;

/// Page texts concatenated with no separator.
pub(super) fn read_pdf(path: &Path) -> Result<String> {
    // pdf-extract panics on some malformed inputs
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path))
        .map_err(|_| RecapError::DocumentParseFailed("PDF parser crashed on this file".into()))?
        .map_err(|e| RecapError::DocumentParseFailed(format!("cannot read PDF: {}", e)))?;

    Ok(pages.concat())
}
