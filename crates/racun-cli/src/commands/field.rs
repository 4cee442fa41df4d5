//! Field command - extract one field from a narrow capture.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use racun_core::{extract_field, FieldType};

use super::document::{self, Document};
use super::output::{format_field, OutputFormat};

/// Arguments for the field command.
#[derive(Args)]
pub struct FieldArgs {
    /// Input file (image, PDF with a text layer, or .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Field to extract (e.g. amount, taxId, dueDate, brojFakture)
    #[arg(long, value_parser = super::parse_field)]
    field: FieldType,

    /// Output format (default: text)
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: FieldArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    info!("Scanning {} for {}", args.input.display(), args.field);

    let value = match document::open(&args.input, &config)? {
        Document::Text(text) => extract_field(&text, args.field),
        Document::Image(bytes) => {
            let service = document::ocr_service(&config, args.model_dir.as_deref())?;

            let pb = document::progress_bar();
            pb.set_message(format!("Reading {}...", args.field.label()));
            let mut on_progress = |percent: u8| pb.set_position(percent.into());

            let scanned = service
                .perform_field_ocr(&bytes, args.field, Some(&mut on_progress))
                .await;

            pb.finish_and_clear();
            scanned.map_err(document::unreadable)?
        }
    };

    if value.is_empty() {
        eprintln!(
            "{} {} not found. Enter it manually.",
            style("!").yellow(),
            args.field.label()
        );
    }

    println!("{}", format_field(args.field, &value, args.format)?.trim_end());

    Ok(())
}
