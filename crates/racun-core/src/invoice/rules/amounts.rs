//! Amount (iznos za plaćanje) extraction for Serbian invoices.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{Pattern, AMOUNT_LOOSE, AMOUNT_PATTERNS};
use super::{all_matches, first_match, ExtractionMatch, ExtractionMode, FieldExtractor};

/// Amount field extractor.
///
/// In [`ExtractionMode::Field`] the chain gains bare comma-decimal and
/// dot-decimal fallbacks.
pub struct AmountExtractor {
    mode: ExtractionMode,
}

impl AmountExtractor {
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
        let mut chain: Vec<&'static Pattern> = AMOUNT_PATTERNS.iter().collect();
        if self.mode == ExtractionMode::Field {
            chain.extend(AMOUNT_LOOSE.iter());
        }
        chain
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        first_match(text, &self.patterns(), normalize_amount)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        all_matches(text, &self.patterns(), normalize_amount)
    }
}

/// Extract the amount due from a whole document.
pub fn extract_amount(text: &str) -> Option<String> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}

fn is_separator(c: char) -> bool {
    c == '.' || c == ','
}

/// Normalize a captured Serbian amount to plain `1234.56` form.
///
/// Every `.` groups thousands and is dropped; the first `,` becomes the
/// decimal point and any later `,` is dropped. Returns an empty string when
/// no digit is present.
pub fn normalize_amount(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut decimal_seen = false;
    for c in raw.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            ',' if !decimal_seen => {
                normalized.push('.');
                decimal_seen = true;
            }
            _ => {}
        }
    }
    finish(normalized)
}

/// Normalize a dot-decimal capture (`1,234.56`): `,` groups thousands and is
/// dropped, the first `.` is the decimal point.
pub fn normalize_dot_decimal(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut decimal_seen = false;
    for c in raw.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            '.' if !decimal_seen => {
                normalized.push('.');
                decimal_seen = true;
            }
            _ => {}
        }
    }
    finish(normalized)
}

fn finish(normalized: String) -> String {
    if !normalized.bytes().any(|b| b.is_ascii_digit()) {
        return String::new();
    }
    normalized.trim_end_matches('.').to_string()
}

/// Parse an amount as typed (`8.831,23`) or as extracted (`8831.23`).
///
/// With a `,` present the Serbian rule applies; otherwise a single `.` is the
/// decimal point and repeated dots group thousands. Anything but digits,
/// separators and a leading `-` is rejected.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit() || is_separator(c)) {
        return None;
    }

    let normalized = if unsigned.contains(',') {
        normalize_amount(unsigned)
    } else if unsigned.matches('.').count() > 1 {
        unsigned.replace('.', "")
    } else {
        unsigned.to_string()
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Format amount in Serbian style (8.831,23).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, decimal_part)
}
