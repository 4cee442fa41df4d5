//! Batch command - scan multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use racun_core::models::config::RacunConfig;
use racun_core::{extract_invoice_data, ExtractionResult, OcrService, PureOcrAdapter};

use super::document::{self, Document};
use super::output::{csv_header, csv_row, format_result, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: output.default_format from the config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Outcome of scanning a single file.
struct ScanOutcome {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config);

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && document::is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Models are loaded on the first image only.
    let mut service: Option<OcrService<PureOcrAdapter>> = None;
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = scan_file(&path, &config, &args, &mut service).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(result) => outcomes.push(ScanOutcome {
                path,
                result: Ok(result),
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                outcomes.push(ScanOutcome {
                    path,
                    result: Err(error_msg),
                    processing_time_ms,
                });
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    for outcome in &outcomes {
        let Ok(result) = &outcome.result else {
            continue;
        };
        let output = format_result(result, format, false)?;

        match &args.output_dir {
            Some(output_dir) => {
                let stem = outcome
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");
                let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));
                fs::write(&output_path, &output)?;
            }
            None => {
                println!("# {}", outcome.path.display());
                println!("{}", output.trim_end());
            }
        }
    }

    if args.summary {
        match &args.output_dir {
            Some(output_dir) => {
                let summary_path = output_dir.join("summary.csv");
                write_summary(csv::Writer::from_path(&summary_path)?, &outcomes)?;
                eprintln!(
                    "{} Summary written to {}",
                    style("✓").green(),
                    summary_path.display()
                );
            }
            None => write_summary(csv::Writer::from_writer(std::io::stdout()), &outcomes)?,
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    eprintln!(
        "{} Processed {} files ({} failed) in {:.1}s",
        style("✓").green(),
        outcomes.len(),
        failed,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

async fn scan_file(
    path: &Path,
    config: &RacunConfig,
    args: &BatchArgs,
    service: &mut Option<OcrService<PureOcrAdapter>>,
) -> anyhow::Result<ExtractionResult> {
    match document::open(path, config)? {
        Document::Text(text) => Ok(extract_invoice_data(&text)),
        Document::Image(bytes) => {
            if service.is_none() {
                *service = Some(document::ocr_service(config, args.model_dir.as_deref())?);
            }
            let Some(service) = service.as_ref() else {
                anyhow::bail!("OCR service unavailable");
            };
            service
                .perform_ocr(&bytes, None)
                .await
                .map_err(document::unreadable)
        }
    }
}

fn write_summary<W: std::io::Write>(
    mut wtr: csv::Writer<W>,
    outcomes: &[ScanOutcome],
) -> anyhow::Result<()> {
    let mut header = vec!["filename", "status"];
    header.extend(csv_header());
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = outcome.processing_time_ms.to_string();

        let mut record = vec![filename];
        match &outcome.result {
            Ok(result) => {
                record.push("success");
                record.extend(csv_row(result));
                record.extend([time.as_str(), ""]);
            }
            Err(error) => {
                record.push("error");
                record.extend(csv_header().iter().map(|_| ""));
                record.extend([time.as_str(), error.as_str()]);
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
