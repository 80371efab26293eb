use mupdf::{Document, TextPageFlags};

use focusflow_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the schema and server code do not
/// transitively depend on it.
///
/// Each call opens its own in-memory document; the handle is dropped before
/// the call returns, on success and on every error path alike.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_page_texts(&self, data: &[u8]) -> Result<Vec<String>, BackendError> {
        let document =
            Document::from_bytes(data, "pdf").map_err(|e| BackendError::Open(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::Open(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }

        let page_count = document
            .page_count()
            .map_err(|e| BackendError::Open(e.to_string()))?;
        if page_count <= 0 {
            return Err(BackendError::Open("document has no pages".into()));
        }

        let mut pages_text = Vec::with_capacity(page_count as usize);

        for page_result in document
            .pages()
            .map_err(|e| BackendError::Extraction(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Extraction(e.to_string()))?;

            // Block/line iteration gives one newline-terminated line per text line
            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        tracing::trace!(pages = pages_text.len(), "mupdf pages read");
        Ok(pages_text)
    }
}
