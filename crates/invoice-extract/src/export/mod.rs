//! Spreadsheet and CSV export of invoice records
//!
//! Generated files land in a fixed export directory, named after the caller's
//! base name plus the current time in milliseconds. Content is rendered in
//! memory and persisted through a temporary file, so a failed export never
//! leaves a file under its final name.

mod delimited;
mod workbook;

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ExportFormat, InvoiceRecord};

pub use delimited::render_delimited_text;
pub use workbook::render_workbook;

/// Writes export files into one directory
#[derive(Debug, Clone)]
pub struct Exporter {
    export_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter for the given directory (created on first export)
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Directory exports are written to
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Generate an `.xlsx` workbook with "Summary" and, when there are line items, "Line Items" sheets
    pub fn generate_workbook(&self, record: &InvoiceRecord, base_name: &str) -> Result<PathBuf> {
        let bytes = render_workbook(record)
            .map_err(|e| Error::export(ExportFormat::Excel, e.to_string()))?;
        self.persist(ExportFormat::Excel, base_name, &bytes)
    }

    /// Generate a `.csv` file with details, line items and financial summary blocks
    pub fn generate_delimited_text(
        &self,
        record: &InvoiceRecord,
        base_name: &str,
    ) -> Result<PathBuf> {
        let bytes = render_delimited_text(record)
            .map_err(|e| Error::export(ExportFormat::Csv, e.to_string()))?;
        self.persist(ExportFormat::Csv, base_name, &bytes)
    }

    /// Generate a file in the requested format
    pub fn generate(
        &self,
        format: ExportFormat,
        record: &InvoiceRecord,
        base_name: &str,
    ) -> Result<PathBuf> {
        match format {
            ExportFormat::Excel => self.generate_workbook(record, base_name),
            ExportFormat::Csv => self.generate_delimited_text(record, base_name),
        }
    }

    fn persist(&self, format: ExportFormat, base_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = format!(
            "{}-{}.{}",
            sanitize_base_name(base_name),
            chrono::Utc::now().timestamp_millis(),
            format.extension()
        );
        let path = self.export_dir.join(file_name);

        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(&self.export_dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&self.export_dir)?;
            tmp.write_all(bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|e| Error::export(format, format!("{}: {}", path.display(), e)))?;

        tracing::info!("Generated {} export {} ({} bytes)", format, path.display(), bytes.len());
        Ok(path)
    }
}

/// Longest stem kept by [`sanitize_base_name`], in bytes
pub const MAX_BASE_NAME_LEN: usize = 100;

/// Make a caller-supplied name safe to use as a file name stem.
///
/// Path separators, reserved characters and control characters become `_`;
/// leading dots are dropped. The result is cut to [`MAX_BASE_NAME_LEN`] bytes
/// on a char boundary. Blank names become `invoice`.
pub fn sanitize_base_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let mut cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.len() > MAX_BASE_NAME_LEN {
        let mut end = MAX_BASE_NAME_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned = cleaned[..end].trim_end();
    }
    if cleaned.is_empty() {
        "invoice".to_string()
    } else {
        cleaned.to_string()
    }
}

/// A value in the key/value blocks shared by both formats
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell<'a> {
    Text(Cow<'a, str>),
    Number(f64),
}

impl Cell<'_> {
    /// Shortest decimal text, e.g. `118` rather than `118.0`
    pub(crate) fn to_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_ref()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    n.to_string()
}

fn or_not_available(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        Cow::Borrowed("N/A")
    } else {
        Cow::Borrowed(value)
    }
}

/// Identifying fields, in output order
pub(crate) fn invoice_details(record: &InvoiceRecord) -> Vec<(&'static str, Cell<'_>)> {
    vec![
        ("Invoice Number", Cell::Text(Cow::Borrowed(record.invoice_number.as_str()))),
        ("Invoice Date", Cell::Text(Cow::Borrowed(record.invoice_date.as_str()))),
        ("Vendor Name", Cell::Text(Cow::Borrowed(record.vendor_name.as_str()))),
        ("Vendor Address", Cell::Text(or_not_available(&record.vendor_address))),
        ("Vendor GSTIN", Cell::Text(or_not_available(&record.vendor_gstin))),
        ("Customer Name", Cell::Text(or_not_available(&record.customer_name))),
    ]
}

/// Amounts and currency, in output order
pub(crate) fn financial_summary(record: &InvoiceRecord) -> Vec<(&'static str, Cell<'_>)> {
    vec![
        ("Subtotal", Cell::Number(record.subtotal)),
        ("CGST", Cell::Number(record.cgst)),
        ("SGST", Cell::Number(record.sgst)),
        ("IGST", Cell::Number(record.igst)),
        ("Total Amount", Cell::Number(record.total_amount)),
        ("Currency", Cell::Text(Cow::Borrowed(record.currency.as_str()))),
    ]
}

/// Header row of the line item table
pub(crate) const LINE_ITEM_HEADERS: [&str; 4] = ["Description", "Quantity", "Rate", "Amount"];

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{InvoiceRecord, LineItem};

    /// INV-1: one widget line, 9% CGST and SGST
    pub fn widget_invoice() -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: "INV-1".to_string(),
            subtotal: 100.0,
            total_amount: 118.0,
            cgst: 9.0,
            sgst: 9.0,
            line_items: vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                rate: 50.0,
                amount: 100.0,
            }],
            ..InvoiceRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::widget_invoice;
    use super::*;

    #[test]
    fn test_sanitize_base_name() {
        assert_eq!(sanitize_base_name("march.pdf"), "march.pdf");
        assert_eq!(sanitize_base_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_base_name("a\\b:c"), "a_b_c");
        assert_eq!(sanitize_base_name("   "), "invoice");
        assert_eq!(sanitize_base_name("..."), "invoice");
    }

    #[test]
    fn test_sanitize_base_name_caps_length() {
        let long = "a".repeat(250);
        assert_eq!(sanitize_base_name(&long), "a".repeat(MAX_BASE_NAME_LEN));

        // 3-byte chars never split
        let wide = "\u{20ac}".repeat(60);
        let capped = sanitize_base_name(&wide);
        assert!(capped.len() <= MAX_BASE_NAME_LEN);
        assert_eq!(capped.chars().count(), MAX_BASE_NAME_LEN / 3);
    }

    #[test]
    fn test_long_base_name_still_exports() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());

        let path = exporter
            .generate_delimited_text(&widget_invoice(), &"b".repeat(250))
            .unwrap();
        assert!(path.exists());
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with(&"b".repeat(MAX_BASE_NAME_LEN)));
        assert!(file_name.len() < 255);
    }

    #[test]
    fn test_format_number_is_shortest() {
        assert_eq!(format_number(118.0), "118");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_generated_names_carry_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("exports"));

        let path = exporter
            .generate_delimited_text(&widget_invoice(), "march")
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("march-"));
        assert!(name.ends_with(".csv"));
        let millis = &name["march-".len()..name.len() - ".csv".len()];
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(path.parent().unwrap(), exporter.export_dir());
    }

    #[test]
    fn test_failed_export_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the export directory should be
        let blocker = dir.path().join("exports");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let exporter = Exporter::new(&blocker);

        let err = exporter
            .generate(ExportFormat::Excel, &widget_invoice(), "inv")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Export {
                format: ExportFormat::Excel,
                ..
            }
        ));
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
