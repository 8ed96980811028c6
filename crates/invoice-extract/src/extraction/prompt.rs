//! Instruction sent alongside every invoice PDF

/// Structured-extraction prompt.
///
/// Field names here must match the wire names of `InvoiceRecord`.
pub const EXTRACTION_PROMPT: &str = r#"You are an expert at extracting structured data from Indian invoices.
Analyze this invoice PDF and extract the following information in JSON format:

{
  "invoiceNumber": "string",
  "invoiceDate": "string (DD/MM/YYYY or DD-MM-YYYY format)",
  "vendorName": "string",
  "vendorAddress": "string (optional)",
  "vendorGSTIN": "string (optional)",
  "customerName": "string (optional)",
  "lineItems": [
    {
      "description": "string",
      "quantity": "number",
      "rate": "number",
      "amount": "number"
    }
  ],
  "subtotal": "number",
  "cgst": "number (optional)",
  "sgst": "number (optional)",
  "igst": "number (optional)",
  "totalAmount": "number",
  "currency": "string (default INR)"
}

Important:
- Extract ALL line items with their description, quantity, rate, and amount
- If GST details are present, include them
- Ensure all numeric values are numbers, not strings
- If a field is not found, use null
- Be precise with the invoice number and date
- Return ONLY valid JSON, no additional text"#;
