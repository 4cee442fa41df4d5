//! Loading invoices from disk and setting up OCR.

use std::fs;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use racun_core::error::{OcrError, PdfError};
use racun_core::models::config::RacunConfig;
use racun_core::{pdf, OcrService, PureOcrAdapter};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tif", "tiff", "bmp"];

/// An invoice as read from disk.
pub enum Document {
    /// Text that needs no OCR: a PDF text layer or a `.txt` file.
    Text(String),
    /// Encoded image bytes for the recognizer.
    Image(Vec<u8>),
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Whether the file looks like something `open` can handle.
pub fn is_supported(path: &Path) -> bool {
    let ext = extension(path);
    ext == "pdf" || ext == "txt" || IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Read an invoice file.
///
/// PDFs contribute their embedded text layer; scanned PDFs without one are
/// rejected since page rasterization is not available.
pub fn open(path: &Path, config: &RacunConfig) -> anyhow::Result<Document> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let data = fs::read(path)?;

    if pdf::is_pdf(&data) {
        return match pdf::embedded_text(&data, &config.pdf) {
            Ok(text) => {
                debug!("Using embedded text layer of {}", path.display());
                Ok(Document::Text(text))
            }
            Err(PdfError::NoText) => anyhow::bail!(
                "{} has no usable text layer. Export its pages as images and scan those.",
                path.display()
            ),
            Err(e) => Err(e.into()),
        };
    }

    match extension(path).as_str() {
        "txt" => Ok(Document::Text(String::from_utf8(data)?)),
        "pdf" => anyhow::bail!("Not a valid PDF file: {}", path.display()),
        ext if IMAGE_EXTENSIONS.contains(&ext) => Ok(Document::Image(data)),
        ext => anyhow::bail!("Unsupported file format: {}", ext),
    }
}

/// Build the OCR service from local PaddleOCR models.
pub fn ocr_service(
    config: &RacunConfig,
    model_dir: Option<&Path>,
) -> anyhow::Result<OcrService<PureOcrAdapter>> {
    let model_dir = model_dir.unwrap_or(&config.ocr.model_dir);

    let adapter = PureOcrAdapter::from_dir(model_dir, &config.ocr).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\nPlace {}, {} and {} in {} or pass --model-dir.",
            e,
            config.ocr.detection_model,
            config.ocr.recognition_model,
            config.ocr.dictionary,
            model_dir.display()
        )
    })?;

    Ok(OcrService::new(adapter))
}

/// Error shown when recognition fails; the form stays editable by hand.
pub fn unreadable(err: OcrError) -> anyhow::Error {
    anyhow::anyhow!(
        "Could not read the document ({}). Enter the fields manually.",
        err
    )
}

/// Progress bar driven by recognition percentages.
pub fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}
