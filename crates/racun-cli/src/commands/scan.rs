//! Scan command - extract every field from a single invoice.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use racun_core::{extract_invoice_data, ExtractionResult};

use super::document::{self, Document};
use super::output::{format_result, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input file (image, PDF with a text layer, or .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: output.default_format from the config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print the recognized text instead of extracted fields
    #[arg(long)]
    raw: bool,

    /// Include the recognized text in the output
    #[arg(long)]
    with_text: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config);

    info!("Scanning file: {}", args.input.display());

    let result = match document::open(&args.input, &config)? {
        Document::Text(text) if args.raw => raw_only(text),
        Document::Text(text) => extract_invoice_data(&text),
        Document::Image(bytes) => {
            let service = document::ocr_service(&config, args.model_dir.as_deref())?;

            let pb = document::progress_bar();
            pb.set_message("Recognizing text...");
            let mut on_progress = |percent: u8| pb.set_position(percent.into());

            let scanned = if args.raw {
                service
                    .recognize(&bytes, Some(&mut on_progress))
                    .await
                    .map(raw_only)
            } else {
                service.perform_ocr(&bytes, Some(&mut on_progress)).await
            };

            pb.finish_with_message("Done");
            scanned.map_err(document::unreadable)?
        }
    };

    if args.raw {
        println!("{}", result.raw_text.trim_end());
        return Ok(());
    }

    if result.is_empty() {
        eprintln!(
            "{} No fields recognized. Enter the fields manually.",
            style("!").yellow()
        );
    }

    let output = format_result(&result, format, args.with_text)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn raw_only(text: String) -> ExtractionResult {
    ExtractionResult {
        raw_text: text,
        ..ExtractionResult::default()
    }
}
