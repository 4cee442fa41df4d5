//! Supplier name (dobavljač) extraction.

use super::patterns::{Pattern, SUPPLIER_PATTERNS};
use super::{all_matches, first_line_match, first_match, trimmed, ExtractionMatch, FieldExtractor};

/// Supplier name extractor.
///
/// Falls back to the first non-blank line of the text when no pattern
/// matches, since scans usually start with the issuer's letterhead.
pub struct SupplierExtractor;

impl SupplierExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The pattern chain, in priority order.
    pub fn patterns(&self) -> Vec<&'static Pattern> {
        SUPPLIER_PATTERNS.iter().collect()
    }
}

impl Default for SupplierExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SupplierExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let chain = self.patterns();
        first_match(text, &chain, trimmed).or_else(|| first_line_match(text, chain.len()))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let chain = self.patterns();
        let mut results = all_matches(text, &chain, trimmed);
        if let Some(line) = first_line_match(text, chain.len()) {
            if !results.iter().any(|r| r.value == line.value) {
                results.push(line);
            }
        }
        results
    }
}

/// Extract the supplier name from text.
pub fn extract_supplier(text: &str) -> Option<String> {
    SupplierExtractor::new().extract(text).map(|m| m.value)
}
