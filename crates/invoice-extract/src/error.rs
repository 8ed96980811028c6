//! Error types for the invoice service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::ExportFormat;

/// Result type alias for invoice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Invoice service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing request input. Raised before any side effect.
    #[error("{error}")]
    Validation {
        error: String,
        message: Option<String>,
    },

    /// External model call or response decoding failed
    #[error("Failed to extract invoice data: {0}")]
    Extraction(String),

    /// Workbook or CSV generation failed
    #[error("Failed to generate {format} file: {message}")]
    Export {
        format: ExportFormat,
        message: String,
    },

    /// Activity log could not be read or written
    #[error("Activity log error: {0}")]
    LogStore(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error without a hint
    pub fn validation(error: impl Into<String>) -> Self {
        Self::Validation {
            error: error.into(),
            message: None,
        }
    }

    /// Create a validation error carrying a human-readable hint
    pub fn validation_with_hint(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            error: error.into(),
            message: Some(message.into()),
        }
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create an export error
    pub fn export(format: ExportFormat, message: impl Into<String>) -> Self {
        Self::Export {
            format,
            message: message.into(),
        }
    }

    /// Create a log store error
    pub fn log_store(message: impl Into<String>) -> Self {
        Self::LogStore(message.into())
    }

    /// Whether this error is a client-side validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Error::Validation { error, message } => {
                (StatusCode::BAD_REQUEST, error.clone(), message.clone())
            }
            Error::Extraction(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process invoice".to_string(),
                Some(self.to_string()),
            ),
            Error::Export { format, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate {} file", format),
                Some(message.clone()),
            ),
            Error::LogStore(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch logs".to_string(),
                Some(msg.clone()),
            ),
            Error::Config(_) | Error::Io(_) | Error::Json(_) | Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(self.to_string()),
            ),
        };

        let mut body = json!({
            "success": false,
            "error": error,
        });
        if let Some(message) = message {
            body["message"] = json!(message);
        }

        (status, Json(body)).into_response()
    }
}
