//! WASM bindings for Serbian invoice OCR.
//!
//! Recognition itself stays in JavaScript (e.g. Tesseract.js); this crate
//! drives it through a `recognize(image, languages, logger)` function and
//! extracts invoice fields from the text it returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Promise, Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use racun_core::error::OcrError;
use racun_core::invoice::{field_candidates, ExtractionMode};
use racun_core::models::invoice::InvoiceDraft;
use racun_core::ocr::{LanguageProfile, ProgressEvent, ProgressTracker, Recognition, RecognitionAdapter};
use racun_core::{ExtractionResult, FieldType, OcrService};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Language codes to pass to the recognizer.
#[wasm_bindgen(js_name = languageProfile)]
pub fn language_profile() -> String {
    LanguageProfile::SERBIAN.to_string()
}

fn parse_field(field: &str) -> Result<FieldType, JsValue> {
    field
        .parse::<FieldType>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract every invoice field from recognized text.
#[wasm_bindgen(js_name = extractInvoiceData)]
pub fn extract_invoice_data(text: &str) -> Result<JsValue, JsValue> {
    to_js(&racun_core::extract_invoice_data(text))
}

/// Extract a single field from recognized text. Empty when not found.
#[wasm_bindgen(js_name = extractField)]
pub fn extract_field(text: &str, field: &str) -> Result<String, JsValue> {
    Ok(racun_core::extract_field(text, parse_field(field)?))
}

#[derive(Serialize)]
struct Candidate {
    value: String,
    rule: &'static str,
    priority: usize,
}

/// Every candidate for a field, highest priority first.
#[wasm_bindgen(js_name = explainField)]
pub fn explain_field(text: &str, field: &str) -> Result<JsValue, JsValue> {
    let candidates: Vec<Candidate> = field_candidates(text, parse_field(field)?, ExtractionMode::Field)
        .into_iter()
        .map(|m| Candidate {
            value: m.value,
            rule: m.rule,
            priority: m.priority,
        })
        .collect();
    to_js(&candidates)
}

/// Pre-fill form state from an extraction result.
///
/// Fields the scan did not recover keep their current form value.
#[wasm_bindgen(js_name = applyExtraction)]
pub fn apply_extraction(form: JsValue, result: JsValue) -> Result<JsValue, JsValue> {
    let mut draft: InvoiceDraft = if form.is_undefined() || form.is_null() {
        InvoiceDraft::default()
    } else {
        serde_wasm_bindgen::from_value(form).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let result: ExtractionResult =
        serde_wasm_bindgen::from_value(result).map_err(|e| JsValue::from_str(&e.to_string()))?;

    draft.apply_extraction(&result);
    to_js(&draft)
}

/// Recognize a whole invoice with a JavaScript recognizer and extract every field.
///
/// `recognize(image: Uint8Array, languages: string, logger)` must return the
/// recognition result or a Promise of it, shaped `{ data: { text } }` or
/// `{ text }`. `onProgress` receives whole percentages while text is being
/// recognized.
#[wasm_bindgen(js_name = performOCR)]
pub async fn perform_ocr(
    image: Vec<u8>,
    recognize: Function,
    on_progress: Option<Function>,
) -> Result<JsValue, JsValue> {
    let service = OcrService::new(JsRecognizer::new(recognize, on_progress));
    let result = service
        .perform_ocr(&image, None)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_js(&result)
}

/// Recognize a narrow capture and extract a single field.
#[wasm_bindgen(js_name = performFieldOCR)]
pub async fn perform_field_ocr(
    image: Vec<u8>,
    field: String,
    recognize: Function,
    on_progress: Option<Function>,
) -> Result<String, JsValue> {
    let field = parse_field(&field)?;
    let service = OcrService::new(JsRecognizer::new(recognize, on_progress));
    service
        .perform_field_ocr(&image, field, None)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Recognition adapter over a JavaScript `recognize` function.
///
/// The logger handed to JavaScript must outlive this call's borrows, so it
/// owns its own [`ProgressTracker`] and reports percentages to `onProgress`
/// directly. The collected events are replayed into the service's sink once
/// recognition settles. The logger is leaked after settling, so late calls
/// only update `onProgress`.
struct JsRecognizer {
    recognize: Function,
    on_progress: Option<Function>,
}

impl JsRecognizer {
    fn new(recognize: Function, on_progress: Option<Function>) -> Self {
        Self {
            recognize,
            on_progress,
        }
    }

    fn logger(&self, events: Weak<RefCell<Vec<ProgressEvent>>>) -> Closure<dyn FnMut(JsValue)> {
        let on_progress = self.on_progress.clone();
        let mut tracker = ProgressTracker::new();

        Closure::new(move |message: JsValue| {
            let Some(event) = progress_event(&message) else {
                return;
            };
            if let (Some(percent), Some(callback)) = (tracker.observe(&event), &on_progress) {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(percent)) {
                    web_sys::console::warn_2(&JsValue::from_str("onProgress failed:"), &e);
                }
            }
            if let Some(events) = events.upgrade() {
                events.borrow_mut().push(event);
            }
        })
    }
}

impl RecognitionAdapter for JsRecognizer {
    async fn recognize(
        &self,
        image: &[u8],
        profile: &LanguageProfile,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<Recognition, OcrError> {
        let start = js_sys::Date::now();
        let events = Rc::new(RefCell::new(Vec::new()));
        let logger = self.logger(Rc::downgrade(&events));

        let pending = self
            .recognize
            .call3(
                &JsValue::NULL,
                &Uint8Array::from(image).into(),
                &JsValue::from_str(profile.as_str()),
                logger.as_ref(),
            )
            .map_err(|e| OcrError::Adapter(describe(&e)))?;

        let settled = JsFuture::from(Promise::resolve(&pending)).await;
        // Engines may keep a reference to the logger and call it after
        // settling; a dropped closure would throw there.
        logger.forget();

        for event in events.borrow_mut().drain(..) {
            progress(event);
        }

        let result = settled.map_err(|e| OcrError::Adapter(describe(&e)))?;
        let text = recognized_text(&result)
            .ok_or_else(|| OcrError::Adapter("recognizer returned no text".to_string()))?;

        Ok(Recognition {
            text,
            processing_time_ms: (js_sys::Date::now() - start).max(0.0) as u64,
        })
    }
}

/// Read `{ status, progress }` from a recognizer log message.
fn progress_event(message: &JsValue) -> Option<ProgressEvent> {
    let status = Reflect::get(message, &JsValue::from_str("status")).ok()?.as_string()?;
    let progress = Reflect::get(message, &JsValue::from_str("progress"))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Some(ProgressEvent::new(status, progress as f32))
}

/// Text of a recognition result: a string, `{ data: { text } }` or `{ text }`.
fn recognized_text(result: &JsValue) -> Option<String> {
    if let Some(text) = result.as_string() {
        return Some(text);
    }
    let data = Reflect::get(result, &JsValue::from_str("data"))
        .ok()
        .filter(|data| data.is_object());
    let holder = data.as_ref().unwrap_or(result);
    Reflect::get(holder, &JsValue::from_str("text")).ok()?.as_string()
}

fn describe(error: &JsValue) -> String {
    if let Some(err) = error.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}
