//! Analyze command implementation
//!
//! Handles `adsage analyze`: load the export, resolve the provider, run the
//! pipeline and persist the run artifacts.

use adsage_config::Config;
use adsage_data::DataLoader;
use adsage_engine::Pipeline;
use adsage_llm::select_backend;
use adsage_utils::error::AdsageError;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::artifacts::ArtifactWriter;

pub async fn execute_analyze_command(
    query: &str,
    data: &Path,
    json: bool,
    config: Arc<Config>,
) -> Result<()> {
    let dataset = DataLoader::new(config.data.required_columns.iter().cloned())
        .load(data)
        .map_err(AdsageError::from)?;
    info!(path = %data.display(), rows = dataset.len(), "Dataset loaded");

    let backend = select_backend(&config).map_err(AdsageError::from)?;

    let writer = ArtifactWriter::new(config.output.dir.clone());
    let pipeline = Pipeline::new(config, backend);
    let result = pipeline
        .run(query, Arc::new(dataset))
        .await
        .map_err(AdsageError::from)?;

    let written = writer.write(&result)?;

    if json {
        let output =
            serde_json::to_string_pretty(&result).context("Failed to serialize run result")?;
        println!("{output}");
        return Ok(());
    }

    if result.is_failed() {
        println!("✗ {}", result.report);
    } else {
        println!("✓ Analysis complete");
        println!("  Hypotheses: {}", result.insights.hypotheses.len());
        println!(
            "  Overall confidence: {:.0}%",
            result.insights.overall_confidence * 100.0
        );
        println!(
            "  Creative recommendations: {}",
            result.creatives.recommendations.len()
        );
    }
    println!();
    println!("Artifacts written to {}:", writer.dir());
    for path in written.paths() {
        println!("  - {path}");
    }

    Ok(())
}
