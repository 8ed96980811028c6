//! Spreadsheet and CSV download endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{Error, Result};
use crate::export::sanitize_base_name;
use crate::server::state::AppState;
use crate::types::{ExportFormat, ExportRequest, NewLogEntry};

/// POST /export/excel - Download the record as an .xlsx workbook
pub async fn export_excel(
    State(state): State<AppState>,
    request: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    export(state, ExportFormat::Excel, request).await
}

/// POST /export/csv - Download the record as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    request: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    export(state, ExportFormat::Csv, request).await
}

async fn export(
    state: AppState,
    format: ExportFormat,
    request: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = request.map_err(|rejection| {
        Error::validation_with_hint("Invalid export request", rejection.body_text())
    })?;

    let base_name = request.base_name().to_string();
    let record = request.data;

    let exporter = state.exporter().clone();
    let stem = base_name.clone();
    let path = tokio::task::spawn_blocking(move || exporter.generate(format, &record, &stem))
        .await
        .map_err(|e| Error::export(format, format!("Export task failed: {}", e)))??;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::export(format, format!("{}: {}", path.display(), e)))?;

    state
        .log_store()
        .record(NewLogEntry::export_succeeded(&base_name, format))
        .await;

    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        sanitize_base_name(&base_name),
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
