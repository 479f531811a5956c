// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File format of the written tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Run configuration. Every field has a default, so a YAML file only needs the
/// keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root holding one directory per round.
    pub input_dir: PathBuf,
    /// Where tables are written.
    pub output_dir: PathBuf,
    /// Write into a `YYYY-MM-DD_HHhMM` subdirectory of `output_dir`.
    pub timestamped: bool,
    pub format: OutputFormat,
    /// Workbook extensions picked up during discovery.
    pub extensions: Vec<String>,
    /// Aggregate players on the rayon pool.
    pub parallel: bool,
    /// Also write `manifest.json` next to the tables.
    pub manifest: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            timestamped: false,
            format: OutputFormat::Csv,
            extensions: ["xlsx", "xlsm", "xls", "ods"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            parallel: true,
            manifest: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Defaults, overlaid with `path` when given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
