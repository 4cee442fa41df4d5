//! Full-document invoice parser.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::field::FieldType;
use super::rules::{
    dates::parse_iso_date, extract_amount, extract_bank_account, extract_dates,
    extract_invoice_number, extract_pib, extract_supplier,
};

/// All fields recovered from one scanned invoice.
///
/// Unmatched fields are empty strings so the result binds directly into
/// form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Supplier name.
    pub supplier_name: String,
    /// Supplier PIB.
    pub tax_id: String,
    /// Invoice number.
    pub invoice_number: String,
    /// Amount due, `.` as decimal separator.
    pub amount: String,
    /// Transaction date, `YYYY-MM-DD`.
    pub transaction_date: String,
    /// Due date, `YYYY-MM-DD`.
    pub due_date: String,
    /// Bank account for payment.
    pub bank_account: String,
    /// Recognized text the fields were extracted from.
    pub raw_text: String,
}

impl ExtractionResult {
    /// Value of one field.
    pub fn get(&self, field: FieldType) -> &str {
        match field {
            FieldType::SupplierName => &self.supplier_name,
            FieldType::TaxId => &self.tax_id,
            FieldType::InvoiceNumber => &self.invoice_number,
            FieldType::Amount => &self.amount,
            FieldType::TransactionDate => &self.transaction_date,
            FieldType::DueDate => &self.due_date,
            FieldType::BankAccount => &self.bank_account,
        }
    }

    /// Fields that were recovered.
    pub fn matched_fields(&self) -> Vec<FieldType> {
        FieldType::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_empty())
            .collect()
    }

    /// Fields left empty.
    pub fn missing_fields(&self) -> Vec<FieldType> {
        FieldType::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// True when no field was recovered.
    pub fn is_empty(&self) -> bool {
        self.matched_fields().is_empty()
    }

    /// The amount as a decimal, if present.
    pub fn amount_value(&self) -> Option<Decimal> {
        Decimal::from_str(&self.amount).ok()
    }

    /// The transaction date as a calendar date, if present and valid.
    pub fn transaction_date_value(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.transaction_date)
    }

    /// The due date as a calendar date, if present and valid.
    pub fn due_date_value(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.due_date)
    }
}

/// Extract every field from the recognized text of a whole invoice.
pub fn extract_invoice_data(text: &str) -> ExtractionResult {
    let dates = extract_dates(text);

    let result = ExtractionResult {
        supplier_name: extract_supplier(text).unwrap_or_default(),
        tax_id: extract_pib(text).unwrap_or_default(),
        invoice_number: extract_invoice_number(text).unwrap_or_default(),
        amount: extract_amount(text).unwrap_or_default(),
        transaction_date: dates.transaction_date.map(|m| m.value).unwrap_or_default(),
        due_date: dates.due_date.map(|m| m.value).unwrap_or_default(),
        bank_account: extract_bank_account(text).unwrap_or_default(),
        raw_text: text.to_string(),
    };

    debug!(
        "Extracted {}/{} fields from {} characters of text",
        result.matched_fields().len(),
        FieldType::ALL.len(),
        text.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::extract_field;
    use pretty_assertions::assert_eq;

    const INVOICE: &str = r#"
ALFA TRADE DOO
Bulevar Oslobođenja 12, Novi Sad
PIB: 101234567
Tekući račun: 160-0000000123456-12

Broj fakture: 2024-0153
Datum prometa: 05.03.2024
Datum dospeća: 20.03.2024

Hleb 10 kom
Iznos za plaćanje: 8.831,23 RSD
"#;

    #[test]
    fn test_parse_full_invoice() {
        let result = extract_invoice_data(INVOICE);

        assert_eq!(
            result,
            ExtractionResult {
                supplier_name: "ALFA TRADE DOO".to_string(),
                tax_id: "101234567".to_string(),
                invoice_number: "2024-0153".to_string(),
                amount: "8831.23".to_string(),
                transaction_date: "2024-03-05".to_string(),
                due_date: "2024-03-20".to_string(),
                bank_account: "160-0000000123456-12".to_string(),
                raw_text: INVOICE.to_string(),
            }
        );
    }

    #[test]
    fn test_empty_text() {
        let result = extract_invoice_data("");
        assert_eq!(result, ExtractionResult::default());
        assert!(result.is_empty());
        assert_eq!(result.missing_fields().len(), 7);
    }

    #[test]
    fn test_positional_dates() {
        let result = extract_invoice_data("Izdato ... 01.02.2024 ... 10.02.2024 ...");
        assert_eq!(result.transaction_date, "2024-02-01");
        assert_eq!(result.due_date, "2024-02-10");
    }

    #[test]
    fn test_label_beats_bare_vp_number() {
        let result = extract_invoice_data("VP999\nbroj fakture: ABC123");
        assert_eq!(result.invoice_number, "ABC123");
    }

    #[test]
    fn test_document_mode_skips_loose_fallbacks() {
        let result = extract_invoice_data("Ref 2024/15\n1.234,56");
        assert_eq!(result.invoice_number, "");
        assert_eq!(result.amount, "");
    }

    #[test]
    fn test_unstructured_text_uses_first_line_for_supplier() {
        let result = extract_invoice_data("nečitljivo\n###");
        assert_eq!(result.supplier_name, "nečitljivo");
        assert_eq!(result.matched_fields(), vec![FieldType::SupplierName]);
    }

    #[test]
    fn test_typed_views() {
        let result = extract_invoice_data(INVOICE);
        assert_eq!(result.amount_value(), Decimal::from_str("8831.23").ok());
        assert_eq!(result.due_date_value(), NaiveDate::from_ymd_opt(2024, 3, 20));
        assert_eq!(result.get(FieldType::TaxId), "101234567");
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let json = serde_json::to_value(extract_invoice_data("PIB: 123456789")).unwrap();
        assert_eq!(json["taxId"], "123456789");
        assert_eq!(json["rawText"], "PIB: 123456789");
        assert_eq!(json["dueDate"], "");
    }

    #[test]
    fn test_noisy_input_never_panics() {
        let long_run = "9".repeat(300);
        let inputs = [
            "",
            " ",
            "\0",
            "\0PIB:\0123456789",
            "PIB:",
            "Prodavac:",
            "Datum dospeća:",
            "Iznos za plaćanje:",
            "Iznos za plaćanje: ,.,.",
            "..,,..//--",
            "\r\n\r\n",
            "Prodavac:\r\nAlfa DOO\r\nPIB: 123456789\r\n",
            "e\u{301}\u{301}\u{301}",
            "PIB: ١٢٣٤٥٦٧٨٩",
            "٠١.٠٢.٢٠٢٤ ١٠.٠٢.٢٠٢٤",
            "१२३-४५६७८९०१२३४५६-७८",
            "VP",
            "31.31.9999",
            "račun: - -",
            long_run.as_str(),
        ];

        for text in inputs {
            let result = extract_invoice_data(text);

            assert!(result.tax_id.is_empty() || result.tax_id.bytes().all(|b| b.is_ascii_digit()));
            for date in [&result.transaction_date, &result.due_date] {
                assert!(date.is_empty() || (date.len() == 10 && date.bytes().all(|b| b.is_ascii_digit() || b == b'-')));
            }
            assert!(
                result.amount.is_empty()
                    || (result.amount.bytes().all(|b| b.is_ascii_digit() || b == b'.')
                        && result.amount.matches('.').count() <= 1)
            );

            for field in FieldType::ALL {
                let _ = extract_field(text, field);
            }
        }
    }

    #[test]
    fn test_non_ascii_digits_are_not_extracted() {
        let result = extract_invoice_data("PIB: ١٢٣٤٥٦٧٨٩\nDatum dospeća: ١٥.٠٣.٢٠٢٤");
        assert_eq!(result.tax_id, "");
        assert_eq!(result.due_date, "");
        assert_eq!(extract_field("१२३४५६७८९", FieldType::TaxId), "");
    }

    #[test]
    fn test_comma_decimal_with_three_digits() {
        let result = extract_invoice_data("Iznos za plaćanje: 1,234");
        assert_eq!(result.amount, "1.234");
        assert_eq!(extract_invoice_data("Total: 12.5").amount, "125");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(extract_invoice_data(INVOICE), extract_invoice_data(INVOICE));
    }
}
