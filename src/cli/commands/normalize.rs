//! Normalize command implementation
//!
//! Handles `adsage normalize`: run the output normalizer over raw text from a
//! file or stdin.

use adsage_config::ConfigError;
use adsage_normalize::ContractKind;
use adsage_utils::error::AdsageError;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

pub fn execute_normalize_command(contract: &str, file: Option<&Path>) -> Result<()> {
    let kind = ContractKind::from_str(contract).map_err(|_| {
        AdsageError::Config(ConfigError::InvalidValue {
            key: "contract".to_string(),
            value: format!("'{contract}' (expected plan, hypotheses, evaluation or creatives)"),
        })
    })?;

    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let value = kind
        .normalize_to_json(&raw)
        .map_err(|e| AdsageError::NormalizationFailed {
            contract: kind.to_string(),
            reason: e.to_string(),
        })?;

    let json = serde_json::to_string_pretty(&value).context("Failed to serialize output")?;
    println!("{json}");

    Ok(())
}
