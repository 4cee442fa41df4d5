//! Core library for Serbian invoice OCR processing.
//!
//! This crate provides:
//! - Rule-based extraction of supplier, PIB, invoice number, amount, dates
//!   and bank account from recognized invoice text
//! - A single-field extractor for narrow camera captures
//! - OCR orchestration over a pluggable recognizer, with progress reporting
//! - The embedded text layer of PDF invoices
//! - Invoice drafts, stored invoices and due-date tracking

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use error::{ExtractionError, OcrError, PdfError, RacunError, Result};
pub use invoice::{extract_field, extract_invoice_data, ExtractionResult, FieldType};
pub use models::config::RacunConfig;
pub use models::invoice::{Invoice, InvoiceDraft, PaymentStatus, Supplier};
pub use ocr::{LanguageProfile, OcrService, ProgressEvent, Recognition, RecognitionAdapter};
#[cfg(feature = "native")]
pub use ocr::PureOcrAdapter;
