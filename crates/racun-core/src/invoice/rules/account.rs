//! Bank account (broj računa) extraction.
//!
//! Serbian accounts have 18 digits grouped 3-13-2 (bank, account, control),
//! commonly printed as `160-0000000123456-12`. Leading zeros of the middle
//! group are often dropped on invoices, hence the looser 3-12-2 rule.

use super::patterns::{Pattern, BANK_ACCOUNT_PATTERNS};
use super::{all_matches, first_match, ExtractionMatch, FieldExtractor};

/// Bank account field extractor.
pub struct AccountExtractor;

impl AccountExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The pattern chain, in priority order.
    pub fn patterns(&self) -> Vec<&'static Pattern> {
        BANK_ACCOUNT_PATTERNS.iter().collect()
    }
}

impl Default for AccountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AccountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(text, &self.patterns(), normalize_account)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        all_matches(text, &self.patterns(), normalize_account)
    }
}

/// Strip embedded whitespace; dashes are kept as printed.
pub fn normalize_account(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extract the bank account from text.
pub fn extract_bank_account(text: &str) -> Option<String> {
    AccountExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashed_account_is_kept() {
        assert_eq!(
            extract_bank_account("Račun: 160-0000000123456-12"),
            Some("160-0000000123456-12".to_string())
        );
    }

    #[test]
    fn test_spaces_are_stripped() {
        let m = AccountExtractor::new()
            .extract("Tekući račun 160 0000000123456 12")
            .unwrap();
        assert_eq!(m.value, "160000000012345612");
        assert_eq!(m.rule, "grouped_3_13_2");
    }

    #[test]
    fn test_short_middle_group() {
        let m = AccountExtractor::new()
            .extract("Uplata na 205-000000012345-67")
            .unwrap();
        assert_eq!(m.value, "205-000000012345-67");
        assert_eq!(m.rule, "grouped_3_12_2");
    }

    #[test]
    fn test_label_with_short_account() {
        let m = AccountExtractor::new()
            .extract("Tekući račun: 840-1234-56")
            .unwrap();
        assert_eq!(m.value, "840-1234-56");
        assert_eq!(m.rule, "racun_label");
    }

    #[test]
    fn test_bare_long_run() {
        let m = AccountExtractor::new()
            .extract("uplatiti na 3251234567 poziv na broj")
            .unwrap();
        assert_eq!(m.value, "3251234567");
        assert_eq!(m.rule, "bare_long_run");
    }

    #[test]
    fn test_pib_sized_run_is_not_an_account() {
        assert_eq!(extract_bank_account("PIB 123456789"), None);
        assert_eq!(extract_bank_account(""), None);
    }
}
