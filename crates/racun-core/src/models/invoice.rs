//! Invoice records, editable drafts and due-date tracking.
//!
//! Serialized names follow the stored document shape (`brojFakture`,
//! `dobavljac`, ...), so records round-trip through the invoice store as is.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::amounts::parse_amount;
use crate::invoice::rules::dates::parse_iso_date;
use crate::invoice::{ExtractionResult, FieldType};

/// Currency assumed for new invoices.
pub const DEFAULT_CURRENCY: &str = "RSD";

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Paid (plaćeno).
    #[serde(rename = "placeno")]
    Paid,
    /// Not yet paid (neplaćeno).
    #[default]
    #[serde(rename = "neplaceno")]
    Unpaid,
}

/// Editable invoice form state.
///
/// Every field is free text as typed or scanned; nothing is validated until
/// [`InvoiceDraft::validate`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDraft {
    #[serde(rename = "brojFakture")]
    pub invoice_number: String,

    #[serde(rename = "dobavljac")]
    pub supplier_name: String,

    #[serde(rename = "pibDobavljaca")]
    pub tax_id: String,

    #[serde(rename = "brojRacunaZaUplatu")]
    pub bank_account: String,

    #[serde(rename = "datumPrometa")]
    pub transaction_date: String,

    #[serde(rename = "datumDospeca")]
    pub due_date: String,

    #[serde(rename = "iznosZaPlacanje")]
    pub amount: String,

    #[serde(rename = "valuta")]
    pub currency: String,

    pub status: PaymentStatus,

    #[serde(rename = "kompanija")]
    pub company: String,

    pub notes: String,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            invoice_number: String::new(),
            supplier_name: String::new(),
            tax_id: String::new(),
            bank_account: String::new(),
            transaction_date: String::new(),
            due_date: String::new(),
            amount: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            status: PaymentStatus::Unpaid,
            company: String::new(),
            notes: String::new(),
        }
    }
}

impl InvoiceDraft {
    /// Create an empty draft for a company.
    pub fn for_company(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Self::default()
        }
    }

    fn slot_mut(&mut self, field: FieldType) -> &mut String {
        match field {
            FieldType::SupplierName => &mut self.supplier_name,
            FieldType::TaxId => &mut self.tax_id,
            FieldType::InvoiceNumber => &mut self.invoice_number,
            FieldType::Amount => &mut self.amount,
            FieldType::TransactionDate => &mut self.transaction_date,
            FieldType::DueDate => &mut self.due_date,
            FieldType::BankAccount => &mut self.bank_account,
        }
    }

    /// Set one field from a scan. Empty values leave the field untouched.
    ///
    /// Returns whether the field changed.
    pub fn apply_field(&mut self, field: FieldType, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        let slot = self.slot_mut(field);
        if *slot == value {
            return false;
        }
        *slot = value.to_string();
        true
    }

    /// Pre-fill the form from a full-document scan.
    ///
    /// Only fields the scan recovered are overwritten; what the user already
    /// typed survives a scan that missed that field. Returns the number of
    /// fields changed.
    pub fn apply_extraction(&mut self, result: &ExtractionResult) -> usize {
        FieldType::ALL
            .into_iter()
            .filter(|field| self.apply_field(*field, result.get(*field)))
            .count()
    }

    /// Parse the amount as typed, by the same rules as a scanned amount.
    pub fn amount_value(&self) -> Option<Decimal> {
        parse_amount(&self.amount)
    }

    /// Validate the draft before saving.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.invoice_number.trim().is_empty() {
            errors.push("Broj fakture is required".to_string());
        }
        if self.supplier_name.trim().is_empty() {
            errors.push("Dobavljač is required".to_string());
        }
        match self.amount_value() {
            None => errors.push(format!("Invalid amount: '{}'", self.amount)),
            Some(amount) if amount.is_sign_negative() => {
                errors.push(format!("Amount must not be negative: {}", amount));
            }
            Some(_) => {}
        }
        if parse_iso_date(&self.due_date).is_none() {
            errors.push(format!("Invalid due date: '{}'", self.due_date));
        }
        if !self.transaction_date.is_empty() && parse_iso_date(&self.transaction_date).is_none() {
            errors.push(format!("Invalid transaction date: '{}'", self.transaction_date));
        }

        errors
    }
}

/// A saved invoice, as kept in the invoice store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,

    #[serde(rename = "brojFakture")]
    pub invoice_number: String,

    #[serde(rename = "dobavljac")]
    pub supplier_name: String,

    #[serde(rename = "pibDobavljaca", default)]
    pub tax_id: String,

    #[serde(rename = "brojRacunaZaUplatu", default)]
    pub bank_account: String,

    #[serde(rename = "datumPrometa", default)]
    pub transaction_date: String,

    #[serde(rename = "datumDospeca")]
    pub due_date: String,

    #[serde(rename = "iznosZaPlacanje")]
    pub amount: Decimal,

    #[serde(rename = "valuta", default = "default_currency")]
    pub currency: String,

    pub status: PaymentStatus,

    #[serde(rename = "kompanija")]
    pub company: String,

    /// Creation time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,

    /// Last update time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: i64,

    #[serde(default)]
    pub created_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Where an invoice stands relative to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Paid,
    Overdue,
    DueToday,
    DueTomorrow,
    Upcoming,
    /// Unpaid, but the due date is missing or not a calendar date.
    NoDueDate,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Due date as a calendar date.
    pub fn due_date_value(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.due_date)
    }

    /// Days from `today` until the due date; negative once overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date_value()
            .map(|due| due.signed_duration_since(today).num_days())
    }

    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        if self.is_paid() {
            return DueStatus::Paid;
        }
        match self.days_until_due(today) {
            None => DueStatus::NoDueDate,
            Some(days) if days < 0 => DueStatus::Overdue,
            Some(0) => DueStatus::DueToday,
            Some(1) => DueStatus::DueTomorrow,
            Some(_) => DueStatus::Upcoming,
        }
    }
}

/// Unpaid invoices due exactly on `today`.
pub fn due_today(invoices: &[Invoice], today: NaiveDate) -> Vec<&Invoice> {
    invoices
        .iter()
        .filter(|invoice| invoice.due_status(today) == DueStatus::DueToday)
        .collect()
}

/// Unpaid invoices whose due date has passed.
pub fn overdue(invoices: &[Invoice], today: NaiveDate) -> Vec<&Invoice> {
    invoices
        .iter()
        .filter(|invoice| invoice.due_status(today) == DueStatus::Overdue)
        .collect()
}

/// Invoices whose supplier name contains `query`, ignoring case.
pub fn search_by_supplier<'a>(invoices: &'a [Invoice], query: &str) -> Vec<&'a Invoice> {
    let query = query.to_lowercase();
    invoices
        .iter()
        .filter(|invoice| invoice.supplier_name.to_lowercase().contains(&query))
        .collect()
}

/// Sum of all unpaid amounts.
pub fn unpaid_total(invoices: &[Invoice]) -> Decimal {
    invoices
        .iter()
        .filter(|invoice| !invoice.is_paid())
        .map(|invoice| invoice.amount)
        .sum()
}

/// A known supplier, remembered for later invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub pib: String,
    #[serde(rename = "brojRacuna")]
    pub bank_account: String,
}

impl Supplier {
    /// Build a supplier record from a scan; `None` when no name was found.
    pub fn from_extraction(result: &ExtractionResult) -> Option<Self> {
        if result.supplier_name.is_empty() {
            return None;
        }
        Some(Self {
            name: result.supplier_name.clone(),
            pib: result.tax_id.clone(),
            bank_account: result.bank_account.clone(),
        })
    }
}
