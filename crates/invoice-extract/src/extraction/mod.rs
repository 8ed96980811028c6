//! Invoice data extraction through an external multimodal model
//!
//! The extractor sends the PDF and a fixed prompt to the model and hands the
//! reply text to a `ResponseAdapter`. Every failure is reported as
//! `Error::Extraction`; nothing is retried.

pub mod adapter;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::InvoiceRecord;

pub use adapter::{FencedJsonAdapter, ResponseAdapter};
pub use gemini::GeminiExtractor;
pub use prompt::EXTRACTION_PROMPT;

/// Trait for turning an invoice PDF into a normalized record
///
/// Implementations:
/// - `GeminiExtractor`: Google Generative Language API (gemini-2.5-flash)
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    /// Extract a record from PDF bytes using the caller's credential
    async fn extract(&self, pdf: &[u8], api_key: &str) -> Result<InvoiceRecord>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
