//! invoice-extract: Invoice PDF extraction service
//!
//! Accepts a PDF invoice over HTTP, has a multimodal Gemini model read it into a
//! normalized `InvoiceRecord`, and turns records into downloadable `.xlsx` or
//! CSV files. Every upload, extraction and export is recorded in a bounded JSON
//! activity log.

pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use export::Exporter;
pub use extraction::{GeminiExtractor, InvoiceExtractor};
pub use pipeline::{InvoiceUpload, UploadPipeline};
pub use server::InvoiceServer;
pub use storage::{JsonFileLogStore, LogStore};
pub use types::{ExportFormat, InvoiceRecord, LineItem, LogEntry};
