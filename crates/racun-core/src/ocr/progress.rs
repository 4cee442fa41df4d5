//! Progress filtering between a recognizer and the UI.

use super::{ProgressEvent, RECOGNIZING_TEXT};

/// Converts recognizer events into whole percentages for a progress bar.
///
/// Only [`RECOGNIZING_TEXT`] events pass. A value lower than the last one
/// forwarded is dropped, so observers see a non-decreasing sequence.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event; returns the percentage to forward, if any.
    pub fn observe(&mut self, event: &ProgressEvent) -> Option<u8> {
        if event.status != RECOGNIZING_TEXT {
            return None;
        }

        let percent = to_percent(event.progress);
        if self.last.is_some_and(|last| percent < last) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }

    /// Last forwarded percentage.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

/// Round a `0.0..=1.0` fraction to a whole percentage, clamped to `0..=100`.
pub fn to_percent(progress: f32) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    (progress * 100.0).round().clamp(0.0, 100.0) as u8
}
