//! Rule-based field extractors for Serbian invoices.

pub mod account;
pub mod amounts;
pub mod dates;
pub mod invoice_number;
pub mod patterns;
pub mod pib;
pub mod supplier;

pub use account::{extract_bank_account, normalize_account, AccountExtractor};
pub use amounts::{extract_amount, normalize_amount, AmountExtractor};
pub use dates::{extract_dates, format_iso_date, DateExtractor, InvoiceDates};
pub use invoice_number::{extract_invoice_number, InvoiceNumberExtractor};
pub use patterns::{Capture, Pattern};
pub use pib::{extract_pib, PibExtractor};
pub use supplier::{extract_supplier, SupplierExtractor};

use tracing::trace;

/// Which extractor variant is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Whole scanned invoice; all fields recovered at once.
    #[default]
    Document,
    /// A narrow capture aimed at one field; extra bare fallbacks apply.
    Field,
}

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every candidate, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted, normalized value.
    pub value: T,
    /// Index of the producing rule in its chain (0 = highest priority).
    pub priority: usize,
    /// Name of the producing rule.
    pub rule: &'static str,
    /// Source text that was matched, before normalization.
    pub source: String,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, priority: usize, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            priority,
            rule,
            source: source.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Rule name reported when a value comes from the first-line fallback.
pub const FIRST_LINE_RULE: &str = "first_line";

/// Apply a single pattern and normalize its capture.
///
/// The pattern's own normalizer, when it has one, replaces `normalize`.
/// A capture that normalizes to an empty string is treated as no match.
fn apply(
    pattern: &Pattern,
    priority: usize,
    text: &str,
    normalize: fn(&str) -> String,
) -> Option<ExtractionMatch<String>> {
    let m = pattern.find(text)?;
    let normalize = pattern.normalize.unwrap_or(normalize);
    let value = normalize(m.as_str());
    trace!(rule = pattern.name, matched = m.as_str(), value = %value, "pattern hit");
    if value.is_empty() {
        return None;
    }
    Some(ExtractionMatch::new(value, priority, pattern.name, m.as_str()).with_position(m.start(), m.end()))
}

/// Run a pattern chain and return the first successful match.
pub(crate) fn first_match(
    text: &str,
    chain: &[&Pattern],
    normalize: fn(&str) -> String,
) -> Option<ExtractionMatch<String>> {
    chain
        .iter()
        .enumerate()
        .find_map(|(priority, pattern)| apply(pattern, priority, text, normalize))
}

/// Run every pattern of a chain, keeping one match per distinct value.
pub(crate) fn all_matches(
    text: &str,
    chain: &[&Pattern],
    normalize: fn(&str) -> String,
) -> Vec<ExtractionMatch<String>> {
    let mut results: Vec<ExtractionMatch<String>> = Vec::new();
    for (priority, pattern) in chain.iter().enumerate() {
        if let Some(found) = apply(pattern, priority, text, normalize) {
            if results.iter().any(|r| r.value == found.value) {
                continue;
            }
            results.push(found);
        }
    }
    results
}

/// First non-blank line of the text, trimmed.
pub(crate) fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Fallback match built from the first non-blank line.
pub(crate) fn first_line_match(text: &str, priority: usize) -> Option<ExtractionMatch<String>> {
    let line = first_line(text)?;
    let start = line.as_ptr() as usize - text.as_ptr() as usize;
    Some(
        ExtractionMatch::new(line.to_string(), priority, FIRST_LINE_RULE, line)
            .with_position(start, start + line.len()),
    )
}

pub(crate) fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

pub(crate) fn without_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n   \n  Alfa DOO  \nPIB"), Some("Alfa DOO"));
        assert_eq!(first_line(""), None);
        assert_eq!(first_line(" \n\t"), None);
    }

    #[test]
    fn test_first_line_match_position() {
        let text = "\n  Alfa\n";
        let m = first_line_match(text, 4).unwrap();
        assert_eq!(m.value, "Alfa");
        assert_eq!(m.rule, FIRST_LINE_RULE);
        assert_eq!(m.priority, 4);
        assert_eq!(m.position, Some((3, 7)));
        assert_eq!(&text[3..7], "Alfa");
    }

    #[test]
    fn test_empty_normalized_capture_continues_chain() {
        let chain: Vec<&Pattern> = patterns::SUPPLIER_PATTERNS.iter().collect();
        // A trailing "prodavac:" with only spaces yields nothing; dobavljač wins.
        let text = "Dobavljač: Beta DOO\nProdavac:   ";
        let m = first_match(text, &chain, trimmed).unwrap();
        assert_eq!(m.value, "Beta DOO");
        assert_eq!(m.rule, "dobavljac");
    }

    #[test]
    fn test_without_whitespace() {
        assert_eq!(without_whitespace(" 160 - 12\t3 "), "160-123");
    }
}
