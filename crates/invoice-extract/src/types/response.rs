//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use super::invoice::InvoiceRecord;
use super::log::LogEntry;

/// Successful upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub data: InvoiceRecord,
    pub file_name: String,
}

/// Body of the export endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub data: InvoiceRecord,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl ExportRequest {
    /// Name used for the download and the stored file, `invoice` when absent
    pub fn base_name(&self) -> &str {
        self.file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("invoice")
    }
}

/// Activity log listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<LogEntry>,
}
