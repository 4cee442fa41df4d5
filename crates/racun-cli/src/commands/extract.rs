//! Extract command - run the field extractors on already recognized text.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;
use console::style;

use racun_core::invoice::{field_candidates, ExtractionMode};
use racun_core::{extract_field, extract_invoice_data, FieldType};

use super::output::{format_field, format_result, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file to read, or `-` for stdin (default: stdin)
    input: Option<PathBuf>,

    /// Extract a single field, as from a narrow capture
    #[arg(long, value_parser = super::parse_field)]
    field: Option<FieldType>,

    /// Show every candidate and the rule that produced it
    #[arg(long)]
    explain: bool,

    /// Output format (default: output.default_format from the config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Include the input text in the output
    #[arg(long)]
    with_text: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let text = read_input(args.input.as_ref())?;

    if args.explain {
        let (fields, mode) = match args.field {
            Some(field) => (vec![field], ExtractionMode::Field),
            None => (FieldType::ALL.to_vec(), ExtractionMode::Document),
        };
        print!("{}", explain(&text, &fields, mode));
        return Ok(());
    }

    match args.field {
        Some(field) => {
            let value = extract_field(&text, field);
            let format = args.format.unwrap_or(OutputFormat::Text);
            println!("{}", format_field(field, &value, format)?.trim_end());
        }
        None => {
            let result = extract_invoice_data(&text);
            let format = OutputFormat::resolve(args.format, &config);
            println!("{}", format_result(&result, format, args.with_text)?.trim_end());
        }
    }

    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// List the candidates of each field, marking the one extraction picks.
fn explain(text: &str, fields: &[FieldType], mode: ExtractionMode) -> String {
    let document = extract_invoice_data(text);
    let mut output = String::new();

    for &field in fields {
        let chosen = match mode {
            ExtractionMode::Document => document.get(field).to_string(),
            ExtractionMode::Field => extract_field(text, field),
        };

        output.push_str(&format!("{} ({})\n", style(field.name()).bold(), field.label()));

        let candidates = field_candidates(text, field, mode);
        if candidates.is_empty() && chosen.is_empty() {
            output.push_str("    (no match)\n");
        }
        for candidate in &candidates {
            let marker = if candidate.value == chosen { "*" } else { " " };
            output.push_str(&format!(
                "  {} {:<30} [{}, priority {}]\n",
                marker, candidate.value, candidate.rule, candidate.priority
            ));
        }
        if !chosen.is_empty() && !candidates.iter().any(|c| c.value == chosen) {
            output.push_str(&format!("  * {:<30} [fallback]\n", chosen));
        }
    }

    output
}
