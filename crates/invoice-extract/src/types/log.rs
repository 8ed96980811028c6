//! Activity log entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::invoice::InvoiceRecord;

/// Pipeline step an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Upload,
    Extraction,
    Export,
}

/// Outcome of the recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Processing,
    Success,
    Failed,
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Excel,
    Csv,
}

impl ExportFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// MIME type used for downloads
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "Excel"),
            ExportFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// An entry before the store has assigned it an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub action: LogAction,
    pub status: LogStatus,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
    pub data: Option<InvoiceRecord>,
    pub error: Option<String>,
    pub format: Option<ExportFormat>,
}

impl NewLogEntry {
    fn new(action: LogAction, status: LogStatus, file_name: impl Into<String>) -> Self {
        Self {
            action,
            status,
            file_name: file_name.into(),
            timestamp: Utc::now(),
            data: None,
            error: None,
            format: None,
        }
    }

    /// An upload has been accepted and is being processed
    pub fn upload_started(file_name: impl Into<String>) -> Self {
        Self::new(LogAction::Upload, LogStatus::Processing, file_name)
    }

    /// Extraction finished with a record
    pub fn extraction_succeeded(file_name: impl Into<String>, record: InvoiceRecord) -> Self {
        Self {
            data: Some(record),
            ..Self::new(LogAction::Extraction, LogStatus::Success, file_name)
        }
    }

    /// Extraction failed with the given diagnostic
    pub fn extraction_failed(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(LogAction::Extraction, LogStatus::Failed, file_name)
        }
    }

    /// An export file was produced
    pub fn export_succeeded(file_name: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            format: Some(format),
            ..Self::new(LogAction::Export, LogStatus::Success, file_name)
        }
    }

    /// Attach the store-assigned id
    pub fn with_id(self, id: u64) -> LogEntry {
        LogEntry {
            id,
            action: self.action,
            status: self.status,
            file_name: self.file_name,
            timestamp: self.timestamp,
            data: self.data,
            error: self.error,
            format: self.format,
        }
    }
}

/// A stored activity log entry. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Creation time in milliseconds, bumped to stay strictly increasing
    pub id: u64,
    pub action: LogAction,
    pub status: LogStatus,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<InvoiceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_format() {
        let entry = NewLogEntry::export_succeeded("inv.pdf", ExportFormat::Csv).with_id(7);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["action"], "export");
        assert_eq!(value["status"], "success");
        assert_eq!(value["fileName"], "inv.pdf");
        assert_eq!(value["format"], "csv");
        assert!(value.get("data").is_none());
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_failed_entry_carries_error() {
        let entry = NewLogEntry::extraction_failed("inv.pdf", "bad key");
        assert_eq!(entry.action, LogAction::Extraction);
        assert_eq!(entry.status, LogStatus::Failed);
        assert_eq!(entry.error.as_deref(), Some("bad key"));
        assert!(entry.data.is_none());
    }
}
