//! Field types and the single-field extractor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractionError;

use super::rules::{
    AccountExtractor, AmountExtractor, DateExtractor, ExtractionMatch, ExtractionMode,
    FieldExtractor, InvoiceNumberExtractor, PibExtractor, SupplierExtractor,
};

/// An invoice field the extractor can recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Supplier name (dobavljač).
    SupplierName,
    /// Supplier tax ID (PIB).
    TaxId,
    /// Invoice number (broj fakture).
    InvoiceNumber,
    /// Amount to pay (iznos za plaćanje).
    Amount,
    /// Transaction date (datum prometa).
    TransactionDate,
    /// Payment due date (datum dospeća).
    DueDate,
    /// Bank account for payment (broj računa).
    BankAccount,
}

impl FieldType {
    /// Every field, in form order.
    pub const ALL: [FieldType; 7] = [
        FieldType::SupplierName,
        FieldType::TaxId,
        FieldType::InvoiceNumber,
        FieldType::Amount,
        FieldType::TransactionDate,
        FieldType::DueDate,
        FieldType::BankAccount,
    ];

    /// Stable camelCase name used in JSON and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::SupplierName => "supplierName",
            FieldType::TaxId => "taxId",
            FieldType::InvoiceNumber => "invoiceNumber",
            FieldType::Amount => "amount",
            FieldType::TransactionDate => "transactionDate",
            FieldType::DueDate => "dueDate",
            FieldType::BankAccount => "bankAccount",
        }
    }

    /// Form label as shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::SupplierName => "Dobavljač",
            FieldType::TaxId => "PIB dobavljača",
            FieldType::InvoiceNumber => "Broj fakture",
            FieldType::Amount => "Iznos za plaćanje",
            FieldType::TransactionDate => "Datum prometa",
            FieldType::DueDate => "Datum dospeća",
            FieldType::BankAccount => "Broj računa za uplatu",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ExtractionError;

    /// Accepts camelCase, snake_case and kebab-case names as well as the
    /// Serbian form field names (`dobavljac`, `pibDobavljaca`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .map(|c| match c {
                'č' | 'ć' => 'c',
                'š' => 's',
                'ž' => 'z',
                'đ' => 'd',
                other => other,
            })
            .collect();

        match key.as_str() {
            "suppliername" | "supplier" | "dobavljac" => Ok(FieldType::SupplierName),
            "taxid" | "pib" | "pibdobavljaca" => Ok(FieldType::TaxId),
            "invoicenumber" | "brojfakture" => Ok(FieldType::InvoiceNumber),
            "amount" | "iznos" | "iznoszaplacanje" => Ok(FieldType::Amount),
            "transactiondate" | "datumprometa" => Ok(FieldType::TransactionDate),
            "duedate" | "datumdospeca" => Ok(FieldType::DueDate),
            "bankaccount" | "brojracuna" | "brojracunazauplatu" => Ok(FieldType::BankAccount),
            _ => Err(ExtractionError::UnknownField(s.to_string())),
        }
    }
}

/// Extract one field from a narrow capture, reporting the producing rule.
///
/// Both date fields take the first date in the text; a strip aimed at one
/// date carries no positional context.
pub fn extract_field_match(text: &str, field: FieldType) -> Option<ExtractionMatch<String>> {
    let found = match field {
        FieldType::SupplierName => SupplierExtractor::new().extract(text),
        FieldType::TaxId => PibExtractor::new().extract(text),
        FieldType::InvoiceNumber => InvoiceNumberExtractor::new()
            .with_mode(ExtractionMode::Field)
            .extract(text),
        FieldType::Amount => AmountExtractor::new()
            .with_mode(ExtractionMode::Field)
            .extract(text),
        FieldType::TransactionDate | FieldType::DueDate => DateExtractor::new().extract(text),
        FieldType::BankAccount => AccountExtractor::new().extract(text),
    };

    match &found {
        Some(m) => debug!(field = %field, rule = m.rule, "field matched"),
        None => debug!(field = %field, "field not found"),
    }
    found
}

/// Extract one field from a narrow capture. Empty when nothing matches.
pub fn extract_field(text: &str, field: FieldType) -> String {
    extract_field_match(text, field)
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Every candidate for a field in the given mode, highest priority first.
pub fn field_candidates(
    text: &str,
    field: FieldType,
    mode: ExtractionMode,
) -> Vec<ExtractionMatch<String>> {
    match field {
        FieldType::SupplierName => SupplierExtractor::new().extract_all(text),
        FieldType::TaxId => PibExtractor::new().extract_all(text),
        FieldType::InvoiceNumber => InvoiceNumberExtractor::new().with_mode(mode).extract_all(text),
        FieldType::Amount => AmountExtractor::new().with_mode(mode).extract_all(text),
        FieldType::TransactionDate | FieldType::DueDate => DateExtractor::new().extract_all(text),
        FieldType::BankAccount => AccountExtractor::new().extract_all(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_names() {
        assert_eq!("supplierName".parse(), Ok(FieldType::SupplierName));
        assert_eq!("tax_id".parse(), Ok(FieldType::TaxId));
        assert_eq!("invoice-number".parse(), Ok(FieldType::InvoiceNumber));
        assert_eq!("iznosZaPlacanje".parse(), Ok(FieldType::Amount));
        assert_eq!("datum_dospeća".parse(), Ok(FieldType::DueDate));
        assert_eq!("brojRacunaZaUplatu".parse(), Ok(FieldType::BankAccount));
        assert_eq!(
            "napomena".parse::<FieldType>(),
            Err(ExtractionError::UnknownField("napomena".to_string()))
        );
    }

    #[test]
    fn test_name_round_trips_through_from_str() {
        for field in FieldType::ALL {
            assert_eq!(field.name().parse::<FieldType>(), Ok(field));
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FieldType::DueDate).unwrap();
        assert_eq!(json, "\"dueDate\"");
    }

    #[test]
    fn test_empty_text_yields_empty_for_every_field() {
        for field in FieldType::ALL {
            assert_eq!(extract_field("", field), "");
        }
    }

    #[test]
    fn test_single_field_dates_use_first_date() {
        let text = "Datum prometa: 01.02.2024 Datum dospeća: 10.02.2024";
        assert_eq!(extract_field(text, FieldType::TransactionDate), "2024-02-01");
        assert_eq!(extract_field(text, FieldType::DueDate), "2024-02-01");
    }

    #[test]
    fn test_single_field_amount_bare_number() {
        assert_eq!(extract_field("  12.480,00  ", FieldType::Amount), "12480.00");
    }

    #[test]
    fn test_single_field_invoice_number_fallbacks() {
        assert_eq!(extract_field("2024/0031", FieldType::InvoiceNumber), "2024/0031");
        assert_eq!(extract_field("bez broja", FieldType::InvoiceNumber), "bez broja");
    }

    #[test]
    fn test_single_field_account_and_pib() {
        assert_eq!(
            extract_field("160-0000000123456-12", FieldType::BankAccount),
            "160-0000000123456-12"
        );
        assert_eq!(extract_field("PIB: 123456789", FieldType::TaxId), "123456789");
    }

    #[test]
    fn test_candidates_in_priority_order() {
        let text = "VP999\nbroj fakture: ABC123";
        let candidates = field_candidates(text, FieldType::InvoiceNumber, ExtractionMode::Document);
        let values: Vec<&str> = candidates.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["ABC123", "VP999"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Prodavac: Alfa DOO\nZa uplatu: 1.000,00";
        for field in FieldType::ALL {
            assert_eq!(extract_field(text, field), extract_field(text, field));
        }
    }
}
