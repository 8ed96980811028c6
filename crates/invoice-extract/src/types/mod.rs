//! Core types for the invoice service

pub mod invoice;
pub mod log;
pub mod response;

pub use invoice::{InvoiceRecord, LineItem};
pub use log::{ExportFormat, LogAction, LogEntry, LogStatus, NewLogEntry};
pub use response::{ExportRequest, LogsResponse, UploadResponse};
