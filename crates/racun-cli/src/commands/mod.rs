//! Subcommands of the `racun` binary.

pub mod batch;
pub mod config;
pub mod document;
pub mod extract;
pub mod field;
pub mod output;
pub mod scan;

use std::path::{Path, PathBuf};

use racun_core::models::config::RacunConfig;
use racun_core::FieldType;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("racun")
        .join("config.json")
}

/// The config file in use: the `--config` path, or the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicit `--config` path must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RacunConfig> {
    match config_path {
        Some(path) => Ok(RacunConfig::from_file(Path::new(path))?),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(RacunConfig::from_file(&path)?)
            } else {
                Ok(RacunConfig::default())
            }
        }
    }
}

/// clap value parser for field names.
pub fn parse_field(name: &str) -> Result<FieldType, String> {
    name.parse::<FieldType>().map_err(|e| {
        let known: Vec<&str> = FieldType::ALL.iter().map(|f| f.name()).collect();
        format!("{} (expected one of: {})", e, known.join(", "))
    })
}
