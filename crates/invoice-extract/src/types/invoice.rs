//! Normalized invoice record
//!
//! `InvoiceRecord` deserializes through a permissive raw shape and fills every
//! missing, `null` or empty field with its default in the same pass, so a decoded
//! record never has an absent value. Values of the wrong shape (a boolean where a
//! number belongs, an object where a string belongs) are rejected.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for identifying fields the model could not read
pub const NOT_AVAILABLE: &str = "N/A";

/// Currency assumed when the invoice does not state one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Confidence reported for every extraction
pub const DEFAULT_CONFIDENCE: &str = "high";

/// Structured data extracted from one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawInvoice")]
pub struct InvoiceRecord {
    pub invoice_number: String,
    pub invoice_date: String,
    pub vendor_name: String,
    pub vendor_address: String,
    #[serde(rename = "vendorGSTIN")]
    pub vendor_gstin: String,
    pub customer_name: String,
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub total_amount: f64,
    pub currency: String,
    /// Always [`DEFAULT_CONFIDENCE`]; not derived from the model output
    pub confidence: String,
}

/// One billed line of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLineItem")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        RawInvoice::default().into()
    }
}

impl InvoiceRecord {
    /// Decode and normalize a JSON value produced by a model or a client.
    ///
    /// The value must be a JSON object; arrays and scalars are rejected rather
    /// than mapped positionally.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        if !value.is_object() {
            return Err(de::Error::custom(format!(
                "expected an invoice object, found {}",
                kind(&value)
            )));
        }
        serde_json::from_value(value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvoice {
    #[serde(default, deserialize_with = "text")]
    invoice_number: Option<String>,
    #[serde(default, deserialize_with = "text")]
    invoice_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    vendor_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    vendor_address: Option<String>,
    #[serde(default, rename = "vendorGSTIN", deserialize_with = "text")]
    vendor_gstin: Option<String>,
    #[serde(default, deserialize_with = "text")]
    customer_name: Option<String>,
    /// `null` elements are dropped
    #[serde(default)]
    line_items: Option<Vec<Option<RawLineItem>>>,
    #[serde(default, deserialize_with = "amount")]
    subtotal: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    cgst: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    sgst: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    igst: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    total_amount: Option<f64>,
    #[serde(default, deserialize_with = "text")]
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLineItem {
    #[serde(default, deserialize_with = "text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    rate: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    amount: Option<f64>,
}

impl From<RawInvoice> for InvoiceRecord {
    fn from(raw: RawInvoice) -> Self {
        Self {
            invoice_number: raw.invoice_number.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            invoice_date: raw.invoice_date.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            vendor_name: raw.vendor_name.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            vendor_address: raw.vendor_address.unwrap_or_default(),
            vendor_gstin: raw.vendor_gstin.unwrap_or_default(),
            customer_name: raw.customer_name.unwrap_or_default(),
            line_items: raw
                .line_items
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(LineItem::from)
                .collect(),
            subtotal: raw.subtotal.unwrap_or_default(),
            cgst: raw.cgst.unwrap_or_default(),
            sgst: raw.sgst.unwrap_or_default(),
            igst: raw.igst.unwrap_or_default(),
            total_amount: raw.total_amount.unwrap_or_default(),
            currency: raw.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            confidence: DEFAULT_CONFIDENCE.to_string(),
        }
    }
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        Self {
            description: raw.description.unwrap_or_default(),
            quantity: raw.quantity.unwrap_or_default(),
            rate: raw.rate.unwrap_or_default(),
            amount: raw.amount.unwrap_or_default(),
        }
    }
}

/// String field: `null` and `""` are absent, numbers keep their decimal text.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string, found {}",
            kind(&other)
        ))),
    }
}

/// Numeric field: accepts numbers and numeric strings such as `"1,180.00"`.
fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("number {} is out of range", n))),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            match cleaned.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(de::Error::custom(format!(
                    "expected a number, found string {:?}",
                    s
                ))),
            }
        }
        other => Err(de::Error::custom(format!(
            "expected a number, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
