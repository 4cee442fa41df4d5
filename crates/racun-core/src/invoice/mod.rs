//! Invoice field extraction module.

mod field;
mod parser;
pub mod rules;

pub use field::{extract_field, extract_field_match, field_candidates, FieldType};
pub use parser::{extract_invoice_data, ExtractionResult};
pub use rules::{ExtractionMatch, ExtractionMode, FieldExtractor};
