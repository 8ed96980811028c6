//! XLSX rendering

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::{financial_summary, invoice_details, Cell, LINE_ITEM_HEADERS};
use crate::types::InvoiceRecord;

/// Render the record as an XLSX workbook.
///
/// The "Line Items" sheet is only added when the record has line items.
pub fn render_workbook(record: &InvoiceRecord) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(summary_sheet(record)?);
    if !record.line_items.is_empty() {
        workbook.push_worksheet(line_items_sheet(record)?);
    }
    workbook.save_to_buffer()
}

fn summary_sheet(record: &InvoiceRecord) -> Result<Worksheet, XlsxError> {
    let heading = Format::new().set_bold();
    let mut sheet = Worksheet::new();
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 30)?;

    let mut row = 0;
    sheet.write_string_with_format(row, 0, "Invoice Details", &heading)?;
    row += 1;
    for (key, value) in invoice_details(record) {
        write_pair(&mut sheet, row, key, &value)?;
        row += 1;
    }

    // blank separator
    row += 1;

    sheet.write_string_with_format(row, 0, "Financial Summary", &heading)?;
    row += 1;
    for (key, value) in financial_summary(record) {
        write_pair(&mut sheet, row, key, &value)?;
        row += 1;
    }

    Ok(sheet)
}

fn line_items_sheet(record: &InvoiceRecord) -> Result<Worksheet, XlsxError> {
    let header = Format::new().set_bold();
    let mut sheet = Worksheet::new();
    sheet.set_name("Line Items")?;
    for (col, width) in [40, 12, 12, 15].into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }

    for (col, title) in LINE_ITEM_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (idx, item) in record.line_items.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, &item.description)?;
        sheet.write_number(row, 1, item.quantity)?;
        sheet.write_number(row, 2, item.rate)?;
        sheet.write_number(row, 3, item.amount)?;
    }

    Ok(sheet)
}

fn write_pair(sheet: &mut Worksheet, row: u32, key: &str, value: &Cell<'_>) -> Result<(), XlsxError> {
    sheet.write_string(row, 0, key)?;
    match value {
        Cell::Text(text) => sheet.write_string(row, 1, text.to_string())?,
        Cell::Number(n) => sheet.write_number(row, 1, *n)?,
    };
    Ok(())
}
