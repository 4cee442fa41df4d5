//! OCR orchestration over a pluggable text recognizer.

mod orchestrator;
mod progress;
#[cfg(feature = "native")]
mod pure_engine;

pub use orchestrator::OcrService;
pub use progress::{to_percent, ProgressTracker};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrAdapter;

use std::fmt;
use std::future::Future;

use crate::error::OcrError;

/// Status reported by a recognizer while it is reading text.
///
/// Only events carrying this status reach progress callbacks.
pub const RECOGNIZING_TEXT: &str = "recognizing text";

/// Recognizer language selection, as a `+`-joined list of language codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile(&'static str);

impl LanguageProfile {
    /// Serbian Cyrillic, Serbian Latin and English.
    pub const SERBIAN: LanguageProfile = LanguageProfile("srp+srp_latn+eng");

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Individual language codes.
    pub fn languages(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('+')
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::SERBIAN
    }
}

impl fmt::Display for LanguageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A progress report from a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Recognizer phase, e.g. `"loading image"` or `"recognizing text"`.
    pub status: String,
    /// Fraction of the phase completed, `0.0..=1.0`.
    pub progress: f32,
}

impl ProgressEvent {
    pub fn new(status: impl Into<String>, progress: f32) -> Self {
        Self {
            status: status.into(),
            progress,
        }
    }
}

/// Text read from one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    /// Recognized text, lines separated by `\n`.
    pub text: String,
    /// Time spent recognizing, in milliseconds.
    pub processing_time_ms: u64,
}

/// A text recognizer the OCR service drives.
///
/// Implementations report progress through `progress` as they go and return
/// the recognized text. Their errors reach callers unchanged.
pub trait RecognitionAdapter {
    /// Recognize the text in an encoded image.
    fn recognize(
        &self,
        image: &[u8],
        profile: &LanguageProfile,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> impl Future<Output = Result<Recognition, OcrError>>;
}
