//! Upload pipeline: validate, store, extract, log
//!
//! Validation failures return before anything is written. Once a file is
//! accepted an `upload/processing` entry is logged, followed by exactly one
//! `extraction/success` or `extraction/failed` entry. Log store failures are
//! reported through tracing and never fail the upload.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::export::sanitize_base_name;
use crate::extraction::InvoiceExtractor;
use crate::storage::LogStore;
use crate::types::{InvoiceRecord, NewLogEntry};

/// Content type every upload must declare
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file received from the client
#[derive(Debug, Clone)]
pub struct InvoiceUpload {
    /// Original file name as sent by the client
    pub file_name: String,
    /// Declared content type
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub record: InvoiceRecord,
    pub file_name: String,
    /// Where the upload was kept. Not cleaned up by the pipeline.
    pub scratch_path: PathBuf,
}

/// Orchestrates one upload from validation to the logged result
pub struct UploadPipeline {
    extractor: Arc<dyn InvoiceExtractor>,
    log_store: Arc<dyn LogStore>,
    scratch_dir: PathBuf,
    max_file_size: usize,
}

impl UploadPipeline {
    /// Create a new pipeline
    pub fn new(
        extractor: Arc<dyn InvoiceExtractor>,
        log_store: Arc<dyn LogStore>,
        scratch_dir: impl Into<PathBuf>,
        max_file_size: usize,
    ) -> Self {
        Self {
            extractor,
            log_store,
            scratch_dir: scratch_dir.into(),
            max_file_size,
        }
    }

    /// Check the request without side effects, returning the accepted upload and credential
    pub fn validate<'a>(
        &self,
        upload: Option<InvoiceUpload>,
        api_key: Option<&'a str>,
    ) -> Result<(InvoiceUpload, &'a str)> {
        let upload = upload.ok_or_else(|| Error::validation("No file uploaded"))?;

        if !is_pdf(upload.content_type.as_deref()) {
            return Err(Error::validation_with_hint(
                "Only PDF files are allowed",
                format!(
                    "'{}' was sent as {}",
                    upload.file_name,
                    upload.content_type.as_deref().unwrap_or("an unknown type")
                ),
            ));
        }

        if upload.bytes.len() > self.max_file_size {
            return Err(Error::validation_with_hint(
                "File too large",
                format!(
                    "'{}' is {} bytes; the limit is {} bytes",
                    upload.file_name,
                    upload.bytes.len(),
                    self.max_file_size
                ),
            ));
        }

        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::validation_with_hint(
                    "Gemini API key is required",
                    "Please provide your Gemini API key in the X-API-Key header",
                )
            })?;

        Ok((upload, api_key))
    }

    /// Run the whole pipeline for one upload
    pub async fn process(
        &self,
        upload: Option<InvoiceUpload>,
        api_key: Option<&str>,
    ) -> Result<UploadOutcome> {
        let (upload, api_key) = self.validate(upload, api_key)?;
        let file_name = upload.file_name.clone();

        tracing::info!(
            "Processing invoice: {} ({} bytes) with {}/{}",
            file_name,
            upload.bytes.len(),
            self.extractor.name(),
            self.extractor.model()
        );
        self.log_store.record(NewLogEntry::upload_started(&file_name)).await;

        match self.extract(&upload, api_key).await {
            Ok((record, scratch_path)) => {
                self.log_store
                    .record(NewLogEntry::extraction_succeeded(&file_name, record.clone()))
                    .await;
                tracing::info!(
                    "Extracted invoice {} from '{}' ({} line items)",
                    record.invoice_number,
                    file_name,
                    record.line_items.len()
                );
                Ok(UploadOutcome {
                    record,
                    file_name,
                    scratch_path,
                })
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Failed to process {}: {}", file_name, message);
                self.log_store
                    .record(NewLogEntry::extraction_failed(&file_name, &message))
                    .await;
                match e {
                    Error::Extraction(_) => Err(e),
                    other => Err(Error::extraction(other.to_string())),
                }
            }
        }
    }

    async fn extract(
        &self,
        upload: &InvoiceUpload,
        api_key: &str,
    ) -> Result<(InvoiceRecord, PathBuf)> {
        let scratch_path = self.store_scratch(upload).await?;
        let record = self.extractor.extract(&upload.bytes, api_key).await?;
        Ok((record, scratch_path))
    }

    async fn store_scratch(&self, upload: &InvoiceUpload) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let path = self.scratch_dir.join(format!(
            "{}-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            sanitize_base_name(&upload.file_name)
        ));
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!("Stored upload at {}", path.display());
        Ok(path)
    }
}

fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileLogStore;
    use crate::types::{LogAction, LogEntry, LogStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Extractor returning a fixed outcome and counting calls
    struct StubExtractor {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl StubExtractor {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl InvoiceExtractor for StubExtractor {
        async fn extract(&self, _pdf: &[u8], _api_key: &str) -> Result<InvoiceRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(Error::extraction(message.clone())),
                None => Ok(InvoiceRecord {
                    invoice_number: "INV-1".to_string(),
                    total_amount: 118.0,
                    ..InvoiceRecord::default()
                }),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        scratch_dir: PathBuf,
        extractor: Arc<StubExtractor>,
        logs: Arc<JsonFileLogStore>,
        pipeline: UploadPipeline,
    }

    fn harness(extractor: StubExtractor) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let scratch_dir = dir.path().join("uploads");
        let extractor = Arc::new(extractor);
        let logs = Arc::new(JsonFileLogStore::new(dir.path().join("activity.json"), 100));
        let pipeline = UploadPipeline::new(
            extractor.clone(),
            logs.clone(),
            &scratch_dir,
            1024,
        );
        Harness {
            _dir: dir,
            scratch_dir,
            extractor,
            logs,
            pipeline,
        }
    }

    fn pdf(name: &str) -> Option<InvoiceUpload> {
        Some(InvoiceUpload {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4 test".to_vec(),
        })
    }

    async fn logs(h: &Harness) -> Vec<LogEntry> {
        h.logs.list().await.unwrap()
    }

    #[tokio::test]
    async fn test_success_logs_two_entries() {
        let h = harness(StubExtractor::ok());

        let outcome = h.pipeline.process(pdf("march.pdf"), Some("key")).await.unwrap();
        assert_eq!(outcome.file_name, "march.pdf");
        assert_eq!(outcome.record.invoice_number, "INV-1");
        assert_eq!(outcome.record.vendor_name, "N/A");

        let entries = logs(&h).await;
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].action, entries[0].status), (LogAction::Upload, LogStatus::Processing));
        assert_eq!((entries[1].action, entries[1].status), (LogAction::Extraction, LogStatus::Success));
        assert_eq!(entries[1].data.as_ref(), Some(&outcome.record));
        assert!(entries.iter().all(|e| e.file_name == "march.pdf"));
    }

    #[tokio::test]
    async fn test_upload_is_kept_in_scratch_dir() {
        let h = harness(StubExtractor::ok());

        let outcome = h.pipeline.process(pdf("a b.pdf"), Some("key")).await.unwrap();
        assert_eq!(outcome.scratch_path.parent().unwrap(), h.scratch_dir.as_path());
        assert!(outcome
            .scratch_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("-a b.pdf"));
        assert_eq!(std::fs::read(&outcome.scratch_path).unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_long_file_name_is_accepted() {
        let h = harness(StubExtractor::ok());
        let name = format!("{}.pdf", "a".repeat(240));

        let outcome = h.pipeline.process(pdf(&name), Some("key")).await.unwrap();
        assert_eq!(outcome.file_name, name);
        assert!(outcome.scratch_path.file_name().unwrap().len() < 255);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);

        let entries = logs(&h).await;
        assert_eq!(entries[1].status, LogStatus::Success);
    }

    #[tokio::test]
    async fn test_extraction_failure_logs_one_failed_entry() {
        let h = harness(StubExtractor::failing("API key not valid"));

        let err = h.pipeline.process(pdf("bad.pdf"), Some("key")).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().contains("API key not valid"));

        let entries = logs(&h).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, LogStatus::Processing);
        assert_eq!((entries[1].action, entries[1].status), (LogAction::Extraction, LogStatus::Failed));
        assert!(entries[1].error.as_deref().unwrap().contains("API key not valid"));
        assert!(entries[1].data.is_none());
        assert_eq!(entries.iter().filter(|e| e.status == LogStatus::Failed).count(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected_without_logging() {
        let h = harness(StubExtractor::ok());

        let err = h.pipeline.process(None, Some("key")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No file uploaded");
        assert!(logs(&h).await.is_empty());
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_or_blank_key_is_rejected_without_logging() {
        let h = harness(StubExtractor::ok());

        for key in [None, Some(""), Some("   ")] {
            let err = h.pipeline.process(pdf("a.pdf"), key).await.unwrap_err();
            assert_eq!(err.to_string(), "Gemini API key is required");
        }
        assert!(logs(&h).await.is_empty());
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
        assert!(!h.scratch_dir.exists());
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected_before_extraction() {
        let h = harness(StubExtractor::ok());
        let upload = Some(InvoiceUpload {
            file_name: "scan.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });

        let err = h.pipeline.process(upload, Some("key")).await.unwrap_err();
        assert_eq!(err.to_string(), "Only PDF files are allowed");
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
        assert!(logs(&h).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let h = harness(StubExtractor::ok());
        let upload = Some(InvoiceUpload {
            file_name: "big.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: vec![0; 1025],
        });

        let err = h.pipeline.process(upload, Some("key")).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Some("application/pdf")));
        assert!(is_pdf(Some("Application/PDF; name=x.pdf")));
        assert!(!is_pdf(Some("application/octet-stream")));
        assert!(!is_pdf(None));
    }
}
