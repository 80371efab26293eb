use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};

use focusflow_core::{Document, PageRecord};

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload;

/// `POST /api/documents/upload`: extract the raw pages of one PDF.
///
/// `raw` carries the extracted pages; `chunks` is whatever the configured
/// [`Chunker`](focusflow_core::Chunker) produces from them.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Document>, ApiError> {
    let file = upload::parse_multipart(multipart).await?;
    tracing::info!(filename = %file.filename, bytes = file.data.len(), "pdf upload received");

    let pages = extract_pdf_blocking(&state, file.data).await?;
    tracing::info!(filename = %file.filename, pages = pages.len(), "pdf extracted");

    Ok(Json(Document::from_pages_with(
        file.filename,
        pages,
        state.chunker.as_ref(),
    )))
}

/// Run extraction on the blocking pool, bounded by the configured timeout.
///
/// On timeout the blocking thread runs to completion in the background and
/// its result is dropped.
async fn extract_pdf_blocking(
    state: &AppState,
    data: Vec<u8>,
) -> Result<Vec<PageRecord>, ApiError> {
    let backend = Arc::clone(&state.backend);
    let task = tokio::task::spawn_blocking(move || {
        focusflow_core::extract_pages(backend.as_ref(), &data)
    });

    let joined = match state.extraction_timeout {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| ApiError::Timeout(limit))?,
        None => task.await,
    };

    let pages = joined.map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;
    Ok(pages)
}
