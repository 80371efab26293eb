use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("empty document")]
    EmptyInput,
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("PDF is password-protected")]
    Encrypted,
    #[error("failed to extract text: {0}")]
    Extraction(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level text extraction step: one raw string
/// per physical page, in physical order. Normalization and empty-page
/// filtering live in [`crate::extract_pages`], so every backend yields the
/// same record shape.
pub trait PdfBackend: Send + Sync {
    /// Extract the raw text of every page of an in-memory PDF.
    fn extract_page_texts(&self, data: &[u8]) -> Result<Vec<String>, BackendError>;
}
