use axum::extract::Multipart;

use focusflow_core::FALLBACK_FILENAME;

use crate::error::ApiError;

/// Form field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Read the `file` field of a multipart upload.
///
/// The declared content type is checked before the body of the field is
/// read, so non-PDF uploads are rejected without touching their bytes.
/// Fields other than `file` are drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            field.bytes().await?;
            continue;
        }

        if !is_pdf_content_type(field.content_type()) {
            return Err(ApiError::InvalidInput("File must be a PDF".into()));
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let data = field.bytes().await?.to_vec();

        return Ok(UploadedFile { filename, data });
    }

    Err(ApiError::InvalidInput("No file uploaded".into()))
}

/// Whether a declared content type names `application/pdf`, ignoring
/// parameters and case.
pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/pdf"))
}
