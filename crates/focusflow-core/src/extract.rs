use crate::backend::{BackendError, PdfBackend};
use crate::schema::PageRecord;

/// The PDF header may be preceded by junk; readers only look this far in.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Collapse newlines to single spaces and trim the ends.
///
/// Other whitespace inside the text is left as the backend produced it.
pub fn normalize_page_text(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Whether `data` carries a `%PDF-` header near its start.
pub fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Extract the non-empty pages of an in-memory PDF.
///
/// Records come back in physical page order with their 1-based physical
/// page number; pages whose normalized text is empty are dropped without
/// renumbering the rest. Any backend failure aborts the whole extraction.
pub fn extract_pages(
    backend: &dyn PdfBackend,
    data: &[u8],
) -> Result<Vec<PageRecord>, BackendError> {
    if data.is_empty() {
        return Err(BackendError::EmptyInput);
    }
    if !has_pdf_header(data) {
        return Err(BackendError::Open("missing %PDF- header".into()));
    }

    let page_texts = backend.extract_page_texts(data)?;
    let total_pages = page_texts.len();

    let records: Vec<PageRecord> = page_texts
        .iter()
        .zip(1u32..)
        .filter_map(|(raw, page)| {
            let text = normalize_page_text(raw);
            (!text.is_empty()).then_some(PageRecord { page, text })
        })
        .collect();

    tracing::debug!(
        bytes = data.len(),
        total_pages,
        kept = records.len(),
        "pdf text extracted"
    );

    Ok(records)
}
