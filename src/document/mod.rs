//! Plain-text extraction from uploaded documents.

mod docx;
mod pdf;

use crate::error::Result;
use crate::media::DocumentKind;
use std::path::Path;

/// Reads the text of a document in source order.
///
/// Implementations are synchronous; the orchestrator runs them on the
/// blocking pool.
pub trait DocumentReader: Send + Sync {
    fn read_text(&self, path: &Path, kind: DocumentKind) -> Result<String>;
}

/// Reads PDF and DOCX files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDocumentReader;

impl DocumentReader for FileDocumentReader {
    fn read_text(&self, path: &Path, kind: DocumentKind) -> Result<String> {
        let text = match kind {
            DocumentKind::Pdf => pdf::read_pdf(path)?,
            DocumentKind::Docx => docx::read_docx(path)?,
        };
        tracing::debug!(kind = %kind, text_len = text.len(), "Document text extracted");
        Ok(text)
    }
}
