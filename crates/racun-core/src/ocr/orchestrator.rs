//! OCR service: recognize an image, then extract invoice fields from its text.

use tracing::{debug, info};

use crate::error::OcrError;
use crate::invoice::{extract_field, extract_invoice_data, ExtractionResult, FieldType};

use super::{LanguageProfile, ProgressEvent, ProgressTracker, RecognitionAdapter};

/// Drives a [`RecognitionAdapter`] with the Serbian language profile and
/// hands the recognized text to the extractors.
///
/// Each call is one adapter call followed by synchronous extraction. There is
/// no retry and no timeout; adapter errors propagate unchanged.
pub struct OcrService<A> {
    adapter: A,
    profile: LanguageProfile,
}

impl<A: RecognitionAdapter> OcrService<A> {
    /// Create a service over the given adapter.
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            profile: LanguageProfile::SERBIAN,
        }
    }

    /// The wrapped adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Language profile passed to every recognition.
    pub fn profile(&self) -> LanguageProfile {
        self.profile
    }

    /// Recognize an image and return its raw text.
    ///
    /// `on_progress` receives whole percentages of the text recognition
    /// phase, never decreasing. No final 100 is sent unless the adapter
    /// reports one.
    pub async fn recognize(
        &self,
        image: &[u8],
        mut on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<String, OcrError> {
        info!("Recognizing {} byte image ({})", image.len(), self.profile);

        let mut tracker = ProgressTracker::new();
        let mut sink = |event: ProgressEvent| {
            debug!(status = %event.status, progress = event.progress, "recognizer progress");
            if let Some(percent) = tracker.observe(&event) {
                if let Some(callback) = on_progress.as_deref_mut() {
                    callback(percent);
                }
            }
        };

        let recognition = self
            .adapter
            .recognize(image, &self.profile, &mut sink)
            .await?;

        info!(
            "Recognized {} characters in {}ms",
            recognition.text.chars().count(),
            recognition.processing_time_ms
        );

        Ok(recognition.text)
    }

    /// Recognize a whole invoice and extract every field.
    pub async fn perform_ocr(
        &self,
        image: &[u8],
        on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<ExtractionResult, OcrError> {
        let text = self.recognize(image, on_progress).await?;
        Ok(extract_invoice_data(&text))
    }

    /// Recognize a narrow capture and extract a single field.
    ///
    /// Returns an empty string when the field is not found.
    pub async fn perform_field_ocr(
        &self,
        image: &[u8],
        field: FieldType,
        on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<String, OcrError> {
        let text = self.recognize(image, on_progress).await?;
        Ok(extract_field(&text, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{Recognition, RECOGNIZING_TEXT};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Replays a fixed event script and returns canned text or an error.
    struct ScriptedAdapter {
        events: Vec<(&'static str, f32)>,
        text: Option<&'static str>,
        profiles: RefCell<Vec<String>>,
    }

    impl ScriptedAdapter {
        fn reading(text: &'static str) -> Self {
            Self {
                events: Vec::new(),
                text: Some(text),
                profiles: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                text: None,
                ..Self::reading("")
            }
        }

        fn with_events(mut self, events: &[(&'static str, f32)]) -> Self {
            self.events = events.to_vec();
            self
        }
    }

    impl RecognitionAdapter for ScriptedAdapter {
        async fn recognize(
            &self,
            _image: &[u8],
            profile: &LanguageProfile,
            progress: &mut dyn FnMut(ProgressEvent),
        ) -> Result<Recognition, OcrError> {
            self.profiles.borrow_mut().push(profile.to_string());
            for (status, value) in &self.events {
                progress(ProgressEvent::new(*status, *value));
            }
            match self.text {
                Some(text) => Ok(Recognition {
                    text: text.to_string(),
                    processing_time_ms: 5,
                }),
                None => Err(OcrError::Recognition("engine crashed".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_perform_ocr_extracts_fields() {
        let service = OcrService::new(ScriptedAdapter::reading(
            "Prodavac: Alfa DOO\nPIB: 123456789\nDatum dospeća: 15.03.2024",
        ));

        let result = service.perform_ocr(b"png", None).await.unwrap();
        assert_eq!(result.supplier_name, "Alfa DOO");
        assert_eq!(result.tax_id, "123456789");
        assert_eq!(result.due_date, "2024-03-15");
        assert_eq!(
            service.adapter().profiles.borrow().as_slice(),
            ["srp+srp_latn+eng".to_string()]
        );
    }

    #[tokio::test]
    async fn test_progress_is_filtered_and_monotonic() {
        let adapter = ScriptedAdapter::reading("").with_events(&[
            ("loading image", 0.5),
            (RECOGNIZING_TEXT, 0.0),
            (RECOGNIZING_TEXT, 0.426),
            (RECOGNIZING_TEXT, 0.3),
            ("initializing api", 0.9),
            (RECOGNIZING_TEXT, 1.0),
        ]);
        let service = OcrService::new(adapter);

        let mut seen = Vec::new();
        let mut on_progress = |percent: u8| seen.push(percent);
        service
            .perform_ocr(b"png", Some(&mut on_progress))
            .await
            .unwrap();

        assert_eq!(seen, vec![0, 43, 100]);
    }

    #[tokio::test]
    async fn test_no_synthetic_completion_event() {
        let adapter = ScriptedAdapter::reading("").with_events(&[(RECOGNIZING_TEXT, 0.5)]);
        let service = OcrService::new(adapter);

        let mut seen = Vec::new();
        let mut on_progress = |percent: u8| seen.push(percent);
        service
            .perform_field_ocr(b"png", FieldType::Amount, Some(&mut on_progress))
            .await
            .unwrap();

        assert_eq!(seen, vec![50]);
    }

    #[tokio::test]
    async fn test_adapter_error_propagates() {
        let service = OcrService::new(ScriptedAdapter::failing());

        let err = service.perform_ocr(b"png", None).await.unwrap_err();
        assert!(matches!(err, OcrError::Recognition(ref msg) if msg == "engine crashed"));

        let err = service
            .perform_field_ocr(b"png", FieldType::TaxId, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
    }

    #[tokio::test]
    async fn test_perform_field_ocr() {
        let service = OcrService::new(ScriptedAdapter::reading("broj fakture: ABC123\nVP999"));
        let value = service
            .perform_field_ocr(b"png", FieldType::InvoiceNumber, None)
            .await
            .unwrap();
        assert_eq!(value, "ABC123");
    }

    #[tokio::test]
    async fn test_field_not_found_is_empty() {
        let service = OcrService::new(ScriptedAdapter::reading("nema podataka"));
        let value = service
            .perform_field_ocr(b"png", FieldType::BankAccount, None)
            .await
            .unwrap();
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn test_recognize_returns_raw_text() {
        let service = OcrService::new(ScriptedAdapter::reading("  Alfa DOO\n"));
        assert_eq!(service.recognize(b"png", None).await.unwrap(), "  Alfa DOO\n");
    }
}
