//! Turning model reply text into an `InvoiceRecord`
//!
//! Providers differ in how they wrap JSON output, so the parsing step is a
//! trait the extractor is configured with.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::InvoiceRecord;

/// Parses a model's textual reply into a normalized record
pub trait ResponseAdapter: Send + Sync {
    /// Parse and normalize the reply
    fn parse(&self, text: &str) -> Result<InvoiceRecord>;

    /// Adapter name for logging
    fn name(&self) -> &str;
}

/// Accepts bare JSON or JSON wrapped in a ```` ``` ```` / ```` ```json ```` fence
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedJsonAdapter;

impl ResponseAdapter for FencedJsonAdapter {
    fn parse(&self, text: &str) -> Result<InvoiceRecord> {
        let body = strip_code_fence(text);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::extraction(format!("Invalid JSON in model response: {}", e)))?;
        InvoiceRecord::from_json(value)
            .map_err(|e| Error::extraction(format!("Unexpected invoice data in model response: {}", e)))
    }

    fn name(&self) -> &str {
        "fenced-json"
    }
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"invoiceNumber\": \"INV-9\", \"totalAmount\": 590, \"cgst\": null}\n```";
        let record = FencedJsonAdapter.parse(reply).unwrap();
        assert_eq!(record.invoice_number, "INV-9");
        assert_eq!(record.total_amount, 590.0);
        assert_eq!(record.cgst, 0.0);
        assert_eq!(record.vendor_name, "N/A");
    }

    #[test]
    fn test_malformed_reply_is_extraction_error() {
        let err = FencedJsonAdapter
            .parse("Sorry, I could not read this invoice.")
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_non_object_reply_is_rejected() {
        let err = FencedJsonAdapter.parse("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
