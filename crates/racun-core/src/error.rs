//! Error types for the racun-core library.

use thiserror::Error;

/// Main error type for the racun library.
#[derive(Error, Debug)]
pub enum RacunError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a recognition adapter.
///
/// The orchestrator never inspects or retries these; they reach the caller
/// exactly as the adapter produced them.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The image could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// An external recognizer (e.g. a JavaScript engine) reported an error.
    #[error("recognizer error: {0}")]
    Adapter(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The data is not a PDF document.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF has no usable text layer.
    #[error("PDF has no embedded text")]
    NoText,
}

/// Errors related to invoice field handling.
///
/// Extraction itself is total; these only arise when naming a field.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// The field name does not correspond to any extractable field.
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Result type for the racun library.
pub type Result<T> = std::result::Result<T, RacunError>;
