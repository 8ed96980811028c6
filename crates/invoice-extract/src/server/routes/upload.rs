//! Invoice upload endpoint

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::error::{Error, Result};
use crate::pipeline::InvoiceUpload;
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// Multipart field carrying the PDF
pub const UPLOAD_FIELD: &str = "invoice";

/// Header carrying the caller's Gemini API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// POST /upload - Extract structured data from one PDF invoice
pub async fn upload_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let upload = match multipart {
        Ok(multipart) => read_invoice_field(multipart).await?,
        Err(rejection) => {
            tracing::debug!("Upload without multipart body: {}", rejection);
            None
        }
    };

    let outcome = state.pipeline().process(upload, api_key).await?;

    Ok(Json(UploadResponse {
        success: true,
        data: outcome.record,
        file_name: outcome.file_name,
    }))
}

/// Read the first `invoice` field, ignoring any others
async fn read_invoice_field(mut multipart: Multipart) -> Result<Option<InvoiceUpload>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(InvoiceUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::validation_with_hint("File too large", e.body_text())
    } else {
        Error::validation_with_hint("Invalid upload", e.body_text())
    }
}
