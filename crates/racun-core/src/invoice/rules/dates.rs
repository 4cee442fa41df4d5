//! Date extraction for Serbian invoices.
//!
//! Dates are written day-first (`15.03.2024`, `1/3/2024`, `01-03-2024`) and
//! always come out as ISO `YYYY-MM-DD`. Calendar validity is not checked.

use chrono::NaiveDate;
use regex::Captures;

use super::patterns::{DATE_DMY, DUE_DATE, TRANSACTION_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Rule name for dates assigned by order of appearance.
pub const POSITIONAL_RULE: &str = "positional";

/// Unlabeled date extractor: every `day.month.year` run, in text order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_DMY
            .captures(text)
            .map(|caps| date_match(&caps, 0, "date"))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .captures_iter(text)
            .map(|caps| date_match(&caps, 0, "date"))
            .collect()
    }
}

/// Transaction and due dates recovered from one document.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDates {
    /// Transaction date (datum prometa).
    pub transaction_date: Option<ExtractionMatch<String>>,
    /// Payment due date (datum dospeća).
    pub due_date: Option<ExtractionMatch<String>>,
}

/// Extract both invoice dates from a whole document.
///
/// A labeled date always wins. Otherwise dates are assigned by position:
/// the first date in the text is the transaction date and the second is the
/// due date. Labeled dates take part in the positional order too.
pub fn extract_dates(text: &str) -> InvoiceDates {
    let positional = DateExtractor::new().extract_all(text);

    let transaction_date = TRANSACTION_DATE
        .captures(text)
        .map(|caps| date_match(&caps, 0, "datum_prometa"))
        .or_else(|| positional.first().map(as_positional));

    let due_date = DUE_DATE
        .captures(text)
        .map(|caps| date_match(&caps, 0, "datum_dospeca"))
        .or_else(|| positional.get(1).map(as_positional));

    InvoiceDates {
        transaction_date,
        due_date,
    }
}

/// Extract the first date anywhere in the text.
pub fn extract_first_date(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Reorder day, month and year into zero-padded ISO form.
pub fn format_iso_date(day: &str, month: &str, year: &str) -> String {
    format!("{}-{:0>2}-{:0>2}", year, month, day)
}

/// Parse an ISO date produced by the extractor into a calendar date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn date_match(caps: &Captures<'_>, priority: usize, rule: &'static str) -> ExtractionMatch<String> {
    let value = format_iso_date(&caps[1], &caps[2], &caps[3]);
    let (start, end) = caps
        .get(0)
        .map(|m| (m.start(), m.end()))
        .unwrap_or_default();
    ExtractionMatch::new(value, priority, rule, &caps[0]).with_position(start, end)
}

fn as_positional(m: &ExtractionMatch<String>) -> ExtractionMatch<String> {
    ExtractionMatch {
        priority: 1,
        rule: POSITIONAL_RULE,
        ..m.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_iso_date_pads() {
        assert_eq!(format_iso_date("1", "2", "2024"), "2024-02-01");
        assert_eq!(format_iso_date("15", "03", "2024"), "2024-03-15");
    }

    #[test]
    fn test_separators() {
        let extractor = DateExtractor::new();
        for text in ["5.3.2024", "5/3/2024", "5-3-2024", "05.03.2024"] {
            assert_eq!(extractor.extract(text).unwrap().value, "2024-03-05");
        }
    }

    #[test]
    fn test_two_digit_year_is_not_a_date() {
        assert!(DateExtractor::new().extract("15.03.24").is_none());
    }

    #[test]
    fn test_no_calendar_validation() {
        assert_eq!(
            DateExtractor::new().extract("31.02.2024").unwrap().value,
            "2024-02-31"
        );
        assert_eq!(parse_iso_date("2024-02-31"), None);
    }

    #[test]
    fn test_labeled_due_date() {
        let dates = extract_dates("Datum dospeća: 15.03.2024");
        let due = dates.due_date.unwrap();
        assert_eq!(due.value, "2024-03-15");
        assert_eq!(due.rule, "datum_dospeca");
    }

    #[test]
    fn test_labeled_dates_beat_position() {
        let text = "Datum: 01.01.2024\nDatum dospeca: 31.01.2024\nDatum prometa: 10.01.2024";
        let dates = extract_dates(text);
        assert_eq!(dates.transaction_date.unwrap().value, "2024-01-10");
        assert_eq!(dates.due_date.unwrap().value, "2024-01-31");
    }

    #[test]
    fn test_positional_fallback() {
        let text = "Beograd, 01.02.2024 ... rok 10.02.2024 ...";
        let dates = extract_dates(text);

        let transaction = dates.transaction_date.unwrap();
        assert_eq!(transaction.value, "2024-02-01");
        assert_eq!(transaction.rule, POSITIONAL_RULE);
        assert_eq!(dates.due_date.unwrap().value, "2024-02-10");
    }

    #[test]
    fn test_single_unlabeled_date_leaves_due_empty() {
        let dates = extract_dates("Izdato 7.4.2024");
        assert_eq!(dates.transaction_date.unwrap().value, "2024-04-07");
        assert!(dates.due_date.is_none());
    }

    #[test]
    fn test_labeled_date_counts_in_positional_order() {
        let dates = extract_dates("Datum prometa: 01.02.2024\nRok 10.02.2024");
        assert_eq!(dates.transaction_date.unwrap().value, "2024-02-01");
        assert_eq!(dates.due_date.unwrap().value, "2024-02-10");
    }

    #[test]
    fn test_cyrillic_labels() {
        let text = "Датум промета: 3.5.2024\nДатум доспећа: 18.5.2024";
        let dates = extract_dates(text);
        assert_eq!(dates.transaction_date.unwrap().value, "2024-05-03");
        assert_eq!(dates.due_date.unwrap().value, "2024-05-18");
    }

    #[test]
    fn test_no_dates() {
        let dates = extract_dates("");
        assert!(dates.transaction_date.is_none());
        assert!(dates.due_date.is_none());
        assert_eq!(extract_first_date("bez datuma"), None);
    }
}
