//! CSV rendering
//!
//! Three blocks separated by blank lines: "Invoice Details", "Line Items" and
//! "Financial Summary". Rows have different widths, so the writers are flexible.
//! Line item rows quote every non-numeric field; all other rows quote only when needed.

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use super::{financial_summary, format_number, invoice_details, Cell, LINE_ITEM_HEADERS};
use crate::types::InvoiceRecord;

/// Render the record as CSV bytes
pub fn render_delimited_text(record: &InvoiceRecord) -> Result<Vec<u8>, csv::Error> {
    let mut out = Vec::new();

    let mut block = writer(out, QuoteStyle::Necessary);
    block.write_record(["Invoice Details"])?;
    write_pairs(&mut block, &invoice_details(record))?;
    out = finish(block)?;
    out.push(b'\n');

    let mut block = writer(out, QuoteStyle::Necessary);
    block.write_record(["Line Items"])?;
    block.write_record(LINE_ITEM_HEADERS)?;
    out = finish(block)?;

    let mut items = writer(out, QuoteStyle::NonNumeric);
    for item in &record.line_items {
        items.write_record([
            item.description.clone(),
            format_number(item.quantity),
            format_number(item.rate),
            format_number(item.amount),
        ])?;
    }
    out = finish(items)?;
    out.push(b'\n');

    let mut block = writer(out, QuoteStyle::Necessary);
    block.write_record(["Financial Summary"])?;
    write_pairs(&mut block, &financial_summary(record))?;
    finish(block)
}

fn writer(buffer: Vec<u8>, style: QuoteStyle) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer)
}

fn write_pairs(writer: &mut Writer<Vec<u8>>, pairs: &[(&str, Cell<'_>)]) -> Result<(), csv::Error> {
    for (key, value) in pairs {
        let text = value.to_text();
        writer.write_record([*key, &*text])?;
    }
    Ok(())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::widget_invoice;
    use crate::types::LineItem;

    fn render(record: &InvoiceRecord) -> String {
        String::from_utf8(render_delimited_text(record).unwrap()).unwrap()
    }

    /// Lines between a block title and the next blank line
    fn block<'a>(text: &'a str, title: &str) -> Vec<&'a str> {
        text.lines()
            .skip_while(|line| *line != title)
            .skip(1)
            .take_while(|line| !line.is_empty())
            .collect()
    }

    #[test]
    fn test_widget_invoice_layout() {
        let text = render(&widget_invoice());

        let items = block(&text, "Line Items");
        assert_eq!(items, vec!["Description,Quantity,Rate,Amount", "\"Widget\",2,50,100"]);

        let summary = block(&text, "Financial Summary");
        assert!(summary.contains(&"Total Amount,118"));
        assert!(summary.contains(&"CGST,9"));
        assert!(summary.contains(&"IGST,0"));
        assert!(summary.contains(&"Currency,INR"));

        let details = block(&text, "Invoice Details");
        assert_eq!(details[0], "Invoice Number,INV-1");
        assert!(details.contains(&"Vendor Address,N/A"));
    }

    #[test]
    fn test_full_document() {
        let text = render(&widget_invoice());
        let expected = "\
Invoice Details
Invoice Number,INV-1
Invoice Date,N/A
Vendor Name,N/A
Vendor Address,N/A
Vendor GSTIN,N/A
Customer Name,N/A

Line Items
Description,Quantity,Rate,Amount
\"Widget\",2,50,100

Financial Summary
Subtotal,100
CGST,9
SGST,9
IGST,0
Total Amount,118
Currency,INR
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_no_line_items_keeps_empty_block() {
        let text = render(&InvoiceRecord::default());
        assert_eq!(block(&text, "Line Items"), vec!["Description,Quantity,Rate,Amount"]);
        assert!(block(&text, "Financial Summary").contains(&"Total Amount,0"));
        assert!(!block(&text, "Invoice Details").is_empty());
    }

    #[test]
    fn test_delimiters_in_values_are_escaped() {
        let mut record = widget_invoice();
        record.vendor_address = "12 MG Road, Pune".to_string();
        record.line_items.push(LineItem {
            description: "Bolt \"M8\", zinc".to_string(),
            quantity: 10.0,
            rate: 1.5,
            amount: 15.0,
        });

        let text = render(&record);
        assert!(text.contains("Vendor Address,\"12 MG Road, Pune\"\n"));
        assert!(text.contains("\"Bolt \"\"M8\"\", zinc\",10,1.5,15\n"));
    }
}
