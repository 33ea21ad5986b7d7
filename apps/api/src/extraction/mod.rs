//! Document extraction — routes uploaded bytes to the PDF or DOCX extractor.
//!
//! Extraction is CPU-bound and the PDF parser can panic on hostile input, so
//! both run on the blocking pool and a panic becomes an extraction error.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;

/// Largest accepted upload: 5 MB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Picks the extractor from the file extension. `.doc` goes through the
    /// DOCX reader and fails cleanly if it is a legacy binary file.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" | "doc" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Only PDF and DOCX files are supported")]
    UnsupportedType,

    #[error("File size exceeds 5MB limit")]
    TooLarge,

    #[error("Could not extract text: {0}")]
    Unreadable(String),

    #[error("No text found in the uploaded file")]
    Empty,
}

impl ExtractionError {
    /// Type and size problems are the client's request; the rest are the document's.
    pub fn is_rejected_upload(&self) -> bool {
        matches!(self, ExtractionError::UnsupportedType | ExtractionError::TooLarge)
    }
}

/// Checks name and size before any parsing happens.
pub fn validate_upload(filename: &str, size: usize) -> Result<DocumentKind, ExtractionError> {
    let kind = DocumentKind::from_filename(filename).ok_or(ExtractionError::UnsupportedType)?;
    if size > MAX_UPLOAD_BYTES {
        return Err(ExtractionError::TooLarge);
    }
    Ok(kind)
}

/// Extracts plain text. Whitespace-only output is `ExtractionError::Empty`.
pub async fn extract_text(bytes: Bytes, kind: DocumentKind) -> Result<String, ExtractionError> {
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf::extract(&bytes),
        DocumentKind::Docx => docx::extract(&bytes),
    })
    .await
    .map_err(|e| ExtractionError::Unreadable(format!("extractor crashed: {e}")))??;

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}
