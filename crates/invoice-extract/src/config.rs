//! Configuration for the invoice service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_LOG_CAPACITY;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Scratch, export and log locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// Sections and fields missing from the file keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Apply `INVOICE_EXTRACT_HOST`, `INVOICE_EXTRACT_PORT`, `FRONTEND_URL` and
    /// `GEMINI_MODEL` from the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("INVOICE_EXTRACT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("INVOICE_EXTRACT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid INVOICE_EXTRACT_PORT '{}': {}", port, e)))?;
        }
        if let Some(origin) = lookup("FRONTEND_URL") {
            self.server.allowed_origin = Some(origin);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Path the invoice routes are nested under
    pub mount_path: String,
    /// Allowed CORS origin (any origin when unset)
    pub allowed_origin: Option<String>,
    /// Maximum uploaded PDF size in bytes (default: 10MB)
    pub max_file_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mount_path: "/api/invoice".to_string(),
            allowed_origin: None,
            max_file_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Scratch directory for uploaded PDFs
    pub upload_dir: PathBuf,
    /// Directory generated spreadsheets are written to
    pub export_dir: PathBuf,
    /// Activity log file
    pub log_path: PathBuf,
    /// Number of most recent log entries kept
    pub log_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            export_dir: PathBuf::from("exports"),
            log_path: PathBuf::from("logs").join("activity.json"),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Gemini (Generative Language API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub base_url: String,
    /// Vision-capable model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for generation
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 120,
            temperature: 0.1, // Low for faithful transcription
        }
    }
}
