//! PIB (Serbian tax identification number) extraction.
//!
//! The PIB check digit is not verified.

use super::patterns::{Pattern, PIB_PATTERNS};
use super::{all_matches, first_match, without_whitespace, ExtractionMatch, FieldExtractor};

/// PIB field extractor.
pub struct PibExtractor;

impl PibExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The pattern chain, in priority order.
    pub fn patterns(&self) -> Vec<&'static Pattern> {
        PIB_PATTERNS.iter().collect()
    }
}

impl Default for PibExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PibExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(text, &self.patterns(), without_whitespace)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        all_matches(text, &self.patterns(), without_whitespace)
    }
}

/// Extract the PIB from text.
pub fn extract_pib(text: &str) -> Option<String> {
    PibExtractor::new().extract(text).map(|m| m.value)
}
