//! Output formatting for extraction results.

use clap::ValueEnum;
use tracing::warn;

use racun_core::invoice::rules::amounts::{format_amount, parse_amount};
use racun_core::models::config::RacunConfig;
use racun_core::{ExtractionResult, FieldType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }

    /// The requested format, or the configured default.
    pub fn resolve(requested: Option<OutputFormat>, config: &RacunConfig) -> OutputFormat {
        requested.unwrap_or_else(|| {
            OutputFormat::from_str(&config.output.default_format, true).unwrap_or_else(|_| {
                warn!(
                    "Unknown output.default_format '{}', using json",
                    config.output.default_format
                );
                OutputFormat::Json
            })
        })
    }
}

/// CSV header: one column per field, in form order.
pub fn csv_header() -> Vec<&'static str> {
    FieldType::ALL.iter().map(|f| f.name()).collect()
}

/// CSV row matching [`csv_header`].
pub fn csv_row(result: &ExtractionResult) -> Vec<&str> {
    FieldType::ALL.iter().map(|f| result.get(*f)).collect()
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    include_raw: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            if include_raw {
                Ok(serde_json::to_string_pretty(result)?)
            } else {
                let mut json = serde_json::to_value(result)?;
                if let Some(obj) = json.as_object_mut() {
                    obj.remove("rawText");
                }
                Ok(serde_json::to_string_pretty(&json)?)
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(csv_header())?;
            wtr.write_record(csv_row(result))?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(format_text(result, include_raw)),
    }
}

fn format_text(result: &ExtractionResult, include_raw: bool) -> String {
    let mut output = String::new();

    for field in FieldType::ALL {
        let value = result.get(field);
        let shown = match field {
            _ if value.is_empty() => "-".to_string(),
            FieldType::Amount => parse_amount(value)
                .map(|amount| format!("{} RSD", format_amount(amount)))
                .unwrap_or_else(|| value.to_string()),
            _ => value.to_string(),
        };
        output.push_str(&format!("{:<22} {}\n", format!("{}:", field.label()), shown));
    }

    if include_raw {
        output.push_str("\nRecognized text:\n");
        output.push_str(&result.raw_text);
        output.push('\n');
    }

    output
}

/// Format a single extracted field.
pub fn format_field(field: FieldType, value: &str, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "field": field,
            "value": value,
        }))?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record([field.name()])?;
            wtr.write_record([value])?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(value.to_string()),
    }
}
