//! Invoice number (broj fakture) extraction.

use super::patterns::{Pattern, INVOICE_NUMBER_LOOSE, INVOICE_NUMBER_PATTERNS};
use super::{
    all_matches, first_line_match, first_match, trimmed, ExtractionMatch, ExtractionMode,
    FieldExtractor,
};

/// Invoice number extractor.
///
/// In [`ExtractionMode::Field`] the chain gains a bare alphanumeric fallback
/// and, after that, the first non-blank line.
pub struct InvoiceNumberExtractor {
    mode: ExtractionMode,
}

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self {
            mode: ExtractionMode::Document,
        }
    }

    /// Set the extraction mode.
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// The pattern chain, in priority order.
    pub fn patterns(&self) -> Vec<&'static Pattern> {
        let mut chain: Vec<&'static Pattern> = INVOICE_NUMBER_PATTERNS.iter().collect();
        if self.mode == ExtractionMode::Field {
            chain.extend(INVOICE_NUMBER_LOOSE.iter());
        }
        chain
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let chain = self.patterns();
        let found = first_match(text, &chain, trimmed);
        match self.mode {
            ExtractionMode::Document => found,
            ExtractionMode::Field => found.or_else(|| first_line_match(text, chain.len())),
        }
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        all_matches(text, &self.patterns(), trimmed)
    }
}

/// Extract the invoice number from a whole document.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    InvoiceNumberExtractor::new().extract(text).map(|m| m.value)
}
