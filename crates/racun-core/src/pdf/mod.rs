//! Embedded text layer of uploaded PDF invoices.
//!
//! Text-based PDFs skip OCR entirely. Scanned PDFs carry no text layer and
//! have to be rasterized before recognition.

use tracing::debug;

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Whether the data starts with the PDF header.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Extract the text layer of a PDF document.
pub fn extract_text(data: &[u8]) -> Result<String> {
    if !is_pdf(data) {
        return Err(PdfError::Parse("missing %PDF header".to_string()));
    }

    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

    debug!("Extracted {} characters of embedded PDF text", text.len());
    Ok(text)
}

/// Text layer usable for field extraction, honoring the PDF settings.
///
/// Fails with [`PdfError::NoText`] when embedded text is disabled or
/// shorter than `min_text_length` characters after trimming.
pub fn embedded_text(data: &[u8], config: &PdfConfig) -> Result<String> {
    if !config.prefer_embedded_text {
        return Err(PdfError::NoText);
    }

    let text = extract_text(data)?;
    let length = text.trim().chars().count();
    if length < config.min_text_length {
        debug!(
            "Embedded text too short ({} < {} characters)",
            length, config.min_text_length
        );
        return Err(PdfError::NoText);
    }

    Ok(text)
}
