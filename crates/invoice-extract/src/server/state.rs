//! Application state for the invoice server

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::export::Exporter;
use crate::extraction::{GeminiExtractor, InvoiceExtractor};
use crate::pipeline::UploadPipeline;
use crate::storage::{JsonFileLogStore, LogStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Upload → extract → log orchestration
    pipeline: UploadPipeline,
    /// Spreadsheet/CSV writer
    exporter: Exporter,
    /// Activity log (shared with the pipeline)
    log_store: Arc<dyn LogStore>,
}

impl AppState {
    /// Create application state with the Gemini extractor and the JSON file log
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing invoice service state...");

        let extractor = Arc::new(GeminiExtractor::new(&config.gemini)?);
        tracing::info!("Gemini extractor initialized (model: {})", config.gemini.model);

        let log_store = Arc::new(JsonFileLogStore::new(
            &config.storage.log_path,
            config.storage.log_capacity,
        ));
        tracing::info!(
            "Activity log at {} (keeps {} entries)",
            config.storage.log_path.display(),
            config.storage.log_capacity
        );

        Ok(Self::from_parts(config, extractor, log_store))
    }

    /// Create application state from explicit providers
    pub fn from_parts(
        config: AppConfig,
        extractor: Arc<dyn InvoiceExtractor>,
        log_store: Arc<dyn LogStore>,
    ) -> Self {
        let pipeline = UploadPipeline::new(
            extractor,
            Arc::clone(&log_store),
            config.storage.upload_dir.clone(),
            config.server.max_file_size,
        );
        let exporter = Exporter::new(config.storage.export_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                exporter,
                log_store,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the upload pipeline
    pub fn pipeline(&self) -> &UploadPipeline {
        &self.inner.pipeline
    }

    /// Get the exporter
    pub fn exporter(&self) -> &Exporter {
        &self.inner.exporter
    }

    /// Get the activity log
    pub fn log_store(&self) -> &Arc<dyn LogStore> {
        &self.inner.log_store
    }
}
