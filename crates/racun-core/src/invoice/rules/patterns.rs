//! Pattern tables for Serbian invoice extraction.
//!
//! Each field owns an ordered table. Label-anchored patterns come first and
//! bare structural patterns last; the first pattern producing a non-empty
//! value wins. Tables ending in `_LOOSE` are appended only in single-field
//! mode, where the input is a narrow camera strip rather than a whole page.

use lazy_static::lazy_static;
use regex::{Match, Regex};

use super::amounts::normalize_dot_decimal;

/// Which part of a regex match becomes the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The first capture group, or the whole match if the group did not participate.
    Group,
    /// The whole match.
    Whole,
}

/// A single entry of a field's pattern table.
#[derive(Debug)]
pub struct Pattern {
    /// Short stable name, reported in diagnostics.
    pub name: &'static str,
    /// Compiled expression.
    pub regex: Regex,
    /// Capture strategy.
    pub capture: Capture,
    /// Normalizer overriding the one the field applies to its chain.
    pub normalize: Option<fn(&str) -> String>,
}

impl Pattern {
    fn new(name: &'static str, expr: &str, capture: Capture) -> Self {
        Self {
            name,
            regex: Regex::new(expr).unwrap(),
            capture,
            normalize: None,
        }
    }

    fn with_normalizer(mut self, normalize: fn(&str) -> String) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// Find the leftmost match and return the captured span.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let caps = self.regex.captures(text)?;
        match self.capture {
            Capture::Group => caps.get(1).or_else(|| caps.get(0)),
            Capture::Whole => caps.get(0),
        }
    }
}

lazy_static! {
    // Supplier name (dobavljač / prodavac)
    pub static ref SUPPLIER_PATTERNS: Vec<Pattern> = vec![
        Pattern::new("prodavac", r"(?i)prodavac[:\s]*([^\n]+)", Capture::Group),
        Pattern::new("dobavljac", r"(?i)dobavlja[čc][:\s]*([^\n]+)", Capture::Group),
        Pattern::new(
            "naziv_doo",
            r"(?i)naziv[:\s]*([^\n]+d\.?o\.?o\.?[^\n]*)",
            Capture::Group,
        ),
        // Case-sensitive: an upper-case company name on a single line.
        Pattern::new(
            "upper_case_doo",
            r"([A-ZČĆŠĐŽ][A-ZČĆŠĐŽ \t]+D\.?O\.?O\.?[^\n]*)",
            Capture::Group,
        ),
    ];

    // PIB (Serbian tax ID, 9 digits)
    pub static ref PIB_PATTERNS: Vec<Pattern> = vec![
        Pattern::new("pib", r"(?i)(?:PIB|ПИБ)[:\s]*([0-9]{9})", Capture::Group),
        Pattern::new("poreski_broj", r"(?i)poreski\s*broj[:\s]*([0-9]{9})", Capture::Group),
        // No word boundaries: any 9 digits, including a slice of a longer run.
        Pattern::new("bare_nine_digits", r"([0-9]{9})", Capture::Group),
    ];

    // Invoice number (broj fakture)
    pub static ref INVOICE_NUMBER_PATTERNS: Vec<Pattern> = vec![
        Pattern::new(
            "broj_fakture",
            r"(?i)broj\s*fakture[:\s]*([A-Z0-9\-/]+)",
            Capture::Group,
        ),
        Pattern::new(
            "broj_dokumenta",
            r"(?i)broj\s*dokumenta[:\s]*([A-Z0-9\-/]+)",
            Capture::Group,
        ),
        Pattern::new(
            "faktura_br",
            r"(?i)faktura\s*br(?:oj)?[:.\s]*([A-Z0-9\-/]+)",
            Capture::Group,
        ),
        Pattern::new("vp_number", r"(?i)VP[0-9]+", Capture::Whole),
        Pattern::new(
            "racun_br",
            r"(?i)ra[čc]un\s*br(?:oj)?[:.\s]*([A-Z0-9\-/]+)",
            Capture::Group,
        ),
    ];

    pub static ref INVOICE_NUMBER_LOOSE: Vec<Pattern> = vec![
        Pattern::new(
            "alphanumeric_run",
            r"(?i)\b([A-Z0-9\-/]*[0-9][A-Z0-9\-/]*)",
            Capture::Group,
        ),
    ];

    // Amount due (iznos za plaćanje)
    pub static ref AMOUNT_PATTERNS: Vec<Pattern> = vec![
        Pattern::new(
            "iznos_za_placanje",
            r"(?i)iznos\s*za\s*pla[cć]anje[:\s]*([0-9.,]+)",
            Capture::Group,
        ),
        Pattern::new(
            "ukupan_iznos_fakture",
            r"(?i)ukupan\s*iznos\s*fakture[:\s]*([0-9.,]+)",
            Capture::Group,
        ),
        Pattern::new("ukupno_rsd", r"(?i)ukupno[:\s]*([0-9.,]+)\s*RSD", Capture::Group),
        Pattern::new("za_uplatu", r"(?i)za\s*uplatu[:\s]*([0-9.,]+)", Capture::Group),
        Pattern::new("total", r"(?i)total[:\s]*([0-9.,]+)", Capture::Group),
    ];

    pub static ref AMOUNT_LOOSE: Vec<Pattern> = vec![
        Pattern::new(
            "comma_decimal",
            r"\b([0-9]{1,3}(?:\.[0-9]{3})*,[0-9]{2}|[0-9]+,[0-9]{2})\b",
            Capture::Group,
        ),
        Pattern::new(
            "dot_decimal",
            r"\b([0-9]{1,3}(?:,[0-9]{3})*\.[0-9]{2}|[0-9]+\.[0-9]{2})\b",
            Capture::Group,
        )
        // The capture itself proves the dot is the decimal point.
        .with_normalizer(normalize_dot_decimal),
    ];

    // Dates: day, month, four-digit year
    pub static ref DATE_DMY: Regex = Regex::new(
        r"([0-9]{1,2})[./\-]([0-9]{1,2})[./\-]([0-9]{4})"
    ).unwrap();

    pub static ref TRANSACTION_DATE: Regex = Regex::new(
        r"(?i)(?:datum|датум)\s*(?:prometa|промета)[:\s]*([0-9]{1,2})[./\-]([0-9]{1,2})[./\-]([0-9]{4})"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)(?:datum|датум)\s*(?:dospe[cć]a|доспећа)[:\s]*([0-9]{1,2})[./\-]([0-9]{1,2})[./\-]([0-9]{4})"
    ).unwrap();

    // Bank account (broj računa): 3-13-2 digit groups
    pub static ref BANK_ACCOUNT_PATTERNS: Vec<Pattern> = vec![
        Pattern::new(
            "grouped_3_13_2",
            r"\b([0-9]{3}[- ]?[0-9]{13}[- ]?[0-9]{2})\b",
            Capture::Group,
        ),
        Pattern::new(
            "grouped_3_12_2",
            r"\b([0-9]{3}[- ]?[0-9]{12,13}[- ]?[0-9]{2})\b",
            Capture::Group,
        ),
        Pattern::new(
            "racun_label",
            r"(?i)(?:teku[ćc]i\s*)?ra[čc]un[:\s]*([0-9][0-9\- ]*[0-9])",
            Capture::Group,
        ),
        Pattern::new(
            "bare_long_run",
            r"\b([0-9]{3}[- ]?[0-9]{7,}(?:[- ]?[0-9]{2})?)\b",
            Capture::Group,
        ),
    ];
}
