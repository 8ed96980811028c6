//! API routes for the invoice server

pub mod export;
pub mod logs;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build all invoice routes
pub fn invoice_routes(max_file_size: usize) -> Router<AppState> {
    Router::new()
        // Upload + extraction - body limit sized to the PDF cap
        .route(
            "/upload",
            post(upload::upload_invoice)
                .layer(DefaultBodyLimit::max(max_file_size + MULTIPART_OVERHEAD)),
        )
        // Downloads
        .route("/export/excel", post(export::export_excel))
        .route("/export/csv", post(export::export_csv))
        // Activity log
        .route("/logs", get(logs::list_logs))
        .route("/logs/test", get(logs::logs_test))
}
