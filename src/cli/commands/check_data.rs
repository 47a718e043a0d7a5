//! Check-data command implementation
//!
//! Handles `adsage check-data`: validate an export and print its summary.

use adsage_config::Config;
use adsage_data::{DataLoader, summarize};
use adsage_utils::error::AdsageError;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CheckDataOutput<'a> {
    rows: usize,
    columns: &'a [String],
    missing_columns: Vec<String>,
    summary: adsage_data::DataSummary,
}

pub fn execute_check_data_command(data: &Path, config: &Config) -> Result<()> {
    let required = &config.data.required_columns;
    let dataset = DataLoader::new(required.iter().cloned())
        .load(data)
        .map_err(AdsageError::from)?;
    let summary = summarize(&dataset, &config.thresholds).map_err(AdsageError::from)?;

    let output = CheckDataOutput {
        rows: dataset.len(),
        columns: dataset.columns(),
        missing_columns: dataset.missing_columns(required.iter().map(String::as_str)),
        summary,
    };
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize summary")?;
    println!("{json}");

    Ok(())
}
