//! Ad performance data for adsage
//!
//! Loads a CSV export into a cleaned [`Dataset`], enforces the critical metric
//! columns, and derives the [`DataSummary`] and creative targeting segments the
//! analysis stages consume.

mod loader;
mod patterns;
mod record;
mod stats;
mod summary;

pub use adsage_utils::error::DataError;
pub use loader::{CRITICAL_COLUMNS, DataLoader};
pub use patterns::{CampaignSnapshot, SuccessfulPatterns, low_ctr_campaigns, successful_patterns};
pub use record::{AdRecord, Dataset};
pub use summary::{
    CampaignBreakdown, CreativeAnalysis, DataSummary, DateRange, GroupStats, Overview,
    PerformanceMetrics, QuantitativeChecks, RowSnapshot, TimeAnalysis, Underperformers,
    WeekMetrics, WeekOverWeek, summarize,
};

/// Fail with `MissingRequiredData` unless `dataset` carries every critical column.
///
/// # Errors
///
/// Returns `DataError::MissingRequiredData` listing the absent columns.
pub fn ensure_critical_columns(dataset: &Dataset) -> Result<(), DataError> {
    let missing = dataset.missing_columns(CRITICAL_COLUMNS);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingRequiredData { columns: missing })
    }
}
