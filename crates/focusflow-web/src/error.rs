use std::time::Duration;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use focusflow_core::BackendError;

/// Failures surfaced by the HTTP layer.
///
/// Only [`ApiError::InvalidInput`] and multipart errors echo their message
/// to the caller; everything else is logged here and answered with a fixed
/// message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("document parse error: {0}")]
    DocumentParse(#[from] BackendError),
    #[error("extraction exceeded {0:?}")]
    Timeout(Duration),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::DocumentParse(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Multipart(e) => e.body_text(),
            ApiError::DocumentParse(_) => "Error processing PDF".to_string(),
            ApiError::Timeout(_) => "PDF processing timed out".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::DocumentParse(e) => tracing::warn!(error = %e, "pdf extraction failed"),
            ApiError::Timeout(limit) => tracing::warn!(?limit, "pdf extraction timed out"),
            ApiError::Internal(e) => tracing::error!(error = %e, "upload failed"),
            ApiError::InvalidInput(_) | ApiError::Multipart(_) => {
                tracing::debug!(error = %self, "rejected upload")
            }
        }
        let body = Json(serde_json::json!({ "detail": self.detail() }));
        (self.status(), body).into_response()
    }
}
