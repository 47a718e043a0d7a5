//! Statistical summary of a cleaned dataset
//!
//! The summary is the context the hypothesis and evaluation stages reason
//! over. It is plain data and serializes to the JSON shown in prompts and in
//! `adsage check-data`.

use adsage_config::Thresholds;
use adsage_utils::error::DataError;
use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::record::{AdRecord, Dataset};
use crate::stats::{mean, median, pct_change, top_by};

/// Groups and rows listed in a ranking.
const TOP_CAMPAIGNS: usize = 5;
const TOP_ROWS: usize = 10;

/// Minimum row count for conclusions to be treated as adequately sampled.
const ADEQUATE_SAMPLE: usize = 30;

/// Relative change, in percent, treated as significant week over week.
const SIGNIFICANT_CHANGE_PCT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub overview: Overview,
    pub performance_metrics: PerformanceMetrics,
    /// Absent when no row has a parseable date.
    pub time_analysis: Option<TimeAnalysis>,
    pub campaign_breakdown: CampaignBreakdown,
    /// Absent when no row names a creative type.
    pub creative_analysis: Option<CreativeAnalysis>,
    pub audience_analysis: Vec<GroupStats>,
    pub platform_analysis: Vec<GroupStats>,
    pub top_performers: Vec<RowSnapshot>,
    pub underperformers: Underperformers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_rows: usize,
    pub date_range: Option<DateRange>,
    pub unique_campaigns: usize,
    pub unique_adsets: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_purchases: u64,
    pub avg_roas: f64,
    pub avg_ctr: f64,
    pub median_roas: f64,
    pub median_ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAnalysis {
    pub recent_week: WeekMetrics,
    pub previous_week: WeekMetrics,
    pub changes: WeekOverWeek,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekMetrics {
    pub avg_roas: f64,
    pub avg_ctr: f64,
    pub total_spend: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekOverWeek {
    pub roas_change_pct: f64,
    pub ctr_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignBreakdown {
    pub total_campaigns: usize,
    pub top_by_revenue: Vec<GroupStats>,
    pub top_by_roas: Vec<GroupStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreativeAnalysis {
    pub by_type: Vec<GroupStats>,
    pub best_type_roas: String,
    pub best_type_ctr: String,
}

/// Aggregates for one value of a grouping column. Rates are means over rows,
/// amounts are sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub name: String,
    pub rows: usize,
    pub spend: f64,
    pub revenue: f64,
    pub roas: f64,
    pub ctr: f64,
    pub clicks: f64,
}

/// A single row as shown in rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowSnapshot {
    pub campaign_name: String,
    pub ctr: f64,
    pub roas: f64,
    pub spend: f64,
    pub creative_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Underperformers {
    pub low_ctr: Vec<RowSnapshot>,
    pub low_roas: Vec<RowSnapshot>,
    pub count_low_ctr: usize,
    pub count_low_roas: usize,
}

/// Deterministic checks handed to the evaluation stage alongside hypotheses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitativeChecks {
    pub sample_size_adequate: bool,
    pub significant_roas_change: Option<bool>,
    pub significant_ctr_change: Option<bool>,
    /// Best to worst creative type ROAS ratio; `1.0` when the worst is zero.
    pub creative_variance: Option<f64>,
    pub has_low_ctr_campaigns: bool,
    pub has_low_roas_campaigns: bool,
}

/// Summarize `dataset` for the analysis stages.
///
/// # Errors
///
/// Returns `DataError::Empty` when the dataset has no rows.
pub fn summarize(dataset: &Dataset, thresholds: &Thresholds) -> Result<DataSummary, DataError> {
    let records = dataset.records();
    if records.is_empty() {
        return Err(DataError::Empty);
    }

    info!(rows = records.len(), "Generating data summary");

    let summary = DataSummary {
        overview: overview(records),
        performance_metrics: performance_metrics(records),
        time_analysis: time_analysis(records),
        campaign_breakdown: campaign_breakdown(records),
        creative_analysis: creative_analysis(records),
        audience_analysis: group_stats(records, |r| &r.audience_type),
        platform_analysis: group_stats(records, |r| &r.platform),
        top_performers: top_performers(records, thresholds),
        underperformers: underperformers(records, thresholds),
    };

    info!(
        campaigns = summary.overview.unique_campaigns,
        low_ctr_rows = summary.underperformers.count_low_ctr,
        low_roas_rows = summary.underperformers.count_low_roas,
        "Data summary complete"
    );
    Ok(summary)
}

impl DataSummary {
    #[must_use]
    pub fn quantitative_checks(&self) -> QuantitativeChecks {
        let changes = self.time_analysis.as_ref().map(|t| &t.changes);

        let creative_variance = self
            .creative_analysis
            .as_ref()
            .filter(|c| c.by_type.len() > 1)
            .map(|c| {
                let roas = c.by_type.iter().map(|g| g.roas);
                let max = roas.clone().fold(f64::NEG_INFINITY, f64::max);
                let min = roas.fold(f64::INFINITY, f64::min);
                if min > 0.0 { max / min } else { 1.0 }
            });

        QuantitativeChecks {
            sample_size_adequate: self.overview.total_rows >= ADEQUATE_SAMPLE,
            significant_roas_change: changes
                .map(|c| c.roas_change_pct.abs() > SIGNIFICANT_CHANGE_PCT),
            significant_ctr_change: changes.map(|c| c.ctr_change_pct.abs() > SIGNIFICANT_CHANGE_PCT),
            creative_variance,
            has_low_ctr_campaigns: self.underperformers.count_low_ctr > 0,
            has_low_roas_campaigns: self.underperformers.count_low_roas > 0,
        }
    }
}

fn overview(records: &[AdRecord]) -> Overview {
    let dates = records.iter().filter_map(|r| r.date);
    let date_range = dates.clone().min().zip(dates.max()).map(|(start, end)| DateRange {
        start,
        end,
        days: (end - start).num_days(),
    });

    let distinct = |field: fn(&AdRecord) -> &str| {
        records
            .iter()
            .map(field)
            .filter(|v| !v.is_empty())
            .collect::<HashSet<_>>()
            .len()
    };

    Overview {
        total_rows: records.len(),
        date_range,
        unique_campaigns: distinct(|r| r.campaign_name.as_str()),
        unique_adsets: distinct(|r| r.adset_name.as_str()),
    }
}

fn performance_metrics(records: &[AdRecord]) -> PerformanceMetrics {
    let total = |field: fn(&AdRecord) -> f64| records.iter().map(field).sum::<f64>();
    let roas: Vec<f64> = records.iter().map(|r| r.roas).collect();
    let ctr: Vec<f64> = records.iter().map(|r| r.ctr).collect();

    PerformanceMetrics {
        total_spend: total(|r| r.spend),
        total_revenue: total(|r| r.revenue),
        total_impressions: total(|r| r.impressions).round() as u64,
        total_clicks: total(|r| r.clicks).round() as u64,
        total_purchases: total(|r| r.purchases).round() as u64,
        avg_roas: mean(&roas),
        avg_ctr: mean(&ctr),
        median_roas: median(&roas),
        median_ctr: median(&ctr),
    }
}

/// Last seven days against the seven before, anchored on the latest date.
fn time_analysis(records: &[AdRecord]) -> Option<TimeAnalysis> {
    let max_date = records.iter().filter_map(|r| r.date).max()?;
    let week_ago = max_date - TimeDelta::days(7);
    let two_weeks_ago = max_date - TimeDelta::days(14);

    let recent: Vec<&AdRecord> = records
        .iter()
        .filter(|r| r.date.is_some_and(|d| d > week_ago))
        .collect();
    let previous: Vec<&AdRecord> = records
        .iter()
        .filter(|r| r.date.is_some_and(|d| d > two_weeks_ago && d <= week_ago))
        .collect();

    let recent_week = week_metrics(&recent);
    let previous_week = week_metrics(&previous);
    let changes = WeekOverWeek {
        roas_change_pct: pct_change(recent_week.avg_roas, previous_week.avg_roas),
        ctr_change_pct: pct_change(recent_week.avg_ctr, previous_week.avg_ctr),
    };

    Some(TimeAnalysis {
        recent_week,
        previous_week,
        changes,
    })
}

fn week_metrics(rows: &[&AdRecord]) -> WeekMetrics {
    let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
    let ctr: Vec<f64> = rows.iter().map(|r| r.ctr).collect();
    WeekMetrics {
        avg_roas: mean(&roas),
        avg_ctr: mean(&ctr),
        total_spend: rows.iter().map(|r| r.spend).sum(),
        total_revenue: rows.iter().map(|r| r.revenue).sum(),
    }
}

fn campaign_breakdown(records: &[AdRecord]) -> CampaignBreakdown {
    let campaigns = group_stats(records, |r| &r.campaign_name);
    CampaignBreakdown {
        total_campaigns: campaigns.len(),
        top_by_revenue: top_by(&campaigns, TOP_CAMPAIGNS, |g| g.revenue),
        top_by_roas: top_by(&campaigns, TOP_CAMPAIGNS, |g| g.roas),
    }
}

fn creative_analysis(records: &[AdRecord]) -> Option<CreativeAnalysis> {
    let by_type = group_stats(records, |r| &r.creative_type);
    let best = |metric: fn(&GroupStats) -> f64| {
        top_by(&by_type, 1, metric)
            .into_iter()
            .next()
            .map(|g| g.name)
    };
    let best_type_roas = best(|g| g.roas)?;
    let best_type_ctr = best(|g| g.ctr)?;

    Some(CreativeAnalysis {
        by_type,
        best_type_roas,
        best_type_ctr,
    })
}

/// Aggregate rows by a text column, skipping rows where it is empty. Groups are
/// ordered by name.
pub(crate) fn group_stats<F>(records: &[AdRecord], key: F) -> Vec<GroupStats>
where
    F: Fn(&AdRecord) -> &String,
{
    let mut groups: BTreeMap<&str, Vec<&AdRecord>> = BTreeMap::new();
    for record in records {
        let name = key(record);
        if !name.is_empty() {
            groups.entry(name.as_str()).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(name, rows)| {
            let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
            let ctr: Vec<f64> = rows.iter().map(|r| r.ctr).collect();
            GroupStats {
                name: name.to_string(),
                rows: rows.len(),
                spend: rows.iter().map(|r| r.spend).sum(),
                revenue: rows.iter().map(|r| r.revenue).sum(),
                roas: mean(&roas),
                ctr: mean(&ctr),
                clicks: rows.iter().map(|r| r.clicks).sum(),
            }
        })
        .collect()
}

impl From<&AdRecord> for RowSnapshot {
    fn from(r: &AdRecord) -> Self {
        Self {
            campaign_name: r.campaign_name.clone(),
            ctr: r.ctr,
            roas: r.roas,
            spend: r.spend,
            creative_message: r.creative_message.clone(),
        }
    }
}

fn top_performers(records: &[AdRecord], thresholds: &Thresholds) -> Vec<RowSnapshot> {
    let eligible: Vec<&AdRecord> = records
        .iter()
        .filter(|r| r.spend >= thresholds.min_spend)
        .collect();
    top_by(&eligible, TOP_ROWS, |r| r.roas)
        .into_iter()
        .map(RowSnapshot::from)
        .collect()
}

fn underperformers(records: &[AdRecord], thresholds: &Thresholds) -> Underperformers {
    let eligible = records.iter().filter(|r| r.spend >= thresholds.min_spend);
    let low_ctr: Vec<&AdRecord> = eligible
        .clone()
        .filter(|r| r.ctr < thresholds.low_ctr)
        .collect();
    let low_roas: Vec<&AdRecord> = eligible.filter(|r| r.roas < thresholds.low_roas).collect();

    Underperformers {
        low_ctr: top_by(&low_ctr, TOP_ROWS, |r| -r.ctr)
            .into_iter()
            .map(RowSnapshot::from)
            .collect(),
        low_roas: top_by(&low_roas, TOP_ROWS, |r| -r.roas)
            .into_iter()
            .map(RowSnapshot::from)
            .collect(),
        count_low_ctr: low_ctr.len(),
        count_low_roas: low_roas.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, campaign: &str, spend: f64, ctr: f64, roas: f64, kind: &str) -> AdRecord {
        AdRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            campaign_name: campaign.to_string(),
            spend,
            ctr,
            roas,
            revenue: spend * roas,
            clicks: 10.0,
            creative_type: kind.to_string(),
            ..AdRecord::default()
        }
    }

    fn dataset(records: Vec<AdRecord>) -> Dataset {
        Dataset::new(["date", "campaign_name", "spend", "revenue", "roas", "ctr"], records)
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let result = summarize(&dataset(Vec::new()), &Thresholds::default());
        assert!(matches!(result, Err(DataError::Empty)));
    }

    #[test]
    fn test_week_over_week_windows() {
        let records = vec![
            // previous window: (Jan 1, Jan 8]
            row("2025-01-05", "A", 100.0, 0.02, 2.0, "Image"),
            // recent window: after Jan 8
            row("2025-01-10", "A", 100.0, 0.01, 3.0, "Image"),
            row("2025-01-15", "B", 100.0, 0.01, 3.0, "Video"),
            // older than two weeks, in neither window
            row("2024-12-20", "C", 100.0, 0.05, 9.0, "Video"),
        ];
        let summary = summarize(&dataset(records), &Thresholds::default()).unwrap();
        let time = summary.time_analysis.unwrap();

        assert_eq!(time.recent_week.avg_roas, 3.0);
        assert_eq!(time.previous_week.avg_roas, 2.0);
        assert!((time.changes.roas_change_pct - 50.0).abs() < 1e-9);
        assert!((time.changes.ctr_change_pct + 50.0).abs() < 1e-9);

        let range = summary.overview.date_range.unwrap();
        assert_eq!(range.days, 26);
    }

    #[test]
    fn test_change_is_zero_without_previous_week() {
        let records = vec![row("2025-01-15", "A", 100.0, 0.01, 3.0, "Image")];
        let summary = summarize(&dataset(records), &Thresholds::default()).unwrap();
        let time = summary.time_analysis.unwrap();
        assert_eq!(time.previous_week.total_spend, 0.0);
        assert_eq!(time.changes.roas_change_pct, 0.0);
    }

    #[test]
    fn test_underperformers_respect_min_spend() {
        let records = vec![
            row("2025-01-15", "A", 50.0, 0.001, 0.5, "Image"),
            row("2025-01-15", "B", 150.0, 0.010, 1.0, "Image"),
            row("2025-01-15", "C", 150.0, 0.005, 4.0, "Video"),
        ];
        let summary = summarize(&dataset(records), &Thresholds::default()).unwrap();
        let under = &summary.underperformers;

        assert_eq!(under.count_low_ctr, 2);
        assert_eq!(under.count_low_roas, 1);
        assert_eq!(under.low_ctr[0].campaign_name, "C");
        assert_eq!(under.low_roas[0].campaign_name, "B");
    }

    #[test]
    fn test_creative_analysis_and_checks() {
        let records = vec![
            row("2025-01-15", "A", 200.0, 0.03, 4.0, "Video"),
            row("2025-01-15", "B", 200.0, 0.01, 2.0, "Image"),
        ];
        let summary = summarize(&dataset(records), &Thresholds::default()).unwrap();
        let creative = summary.creative_analysis.as_ref().unwrap();
        assert_eq!(creative.best_type_roas, "Video");
        assert_eq!(creative.best_type_ctr, "Video");

        let checks = summary.quantitative_checks();
        assert!(!checks.sample_size_adequate);
        assert_eq!(checks.creative_variance, Some(2.0));
        assert!(checks.has_low_ctr_campaigns);
        assert!(checks.has_low_roas_campaigns);
        assert_eq!(checks.significant_roas_change, Some(false));
    }

    #[test]
    fn test_summary_without_dates_or_types() {
        let records = vec![AdRecord {
            spend: 10.0,
            roas: 1.0,
            ctr: 0.02,
            ..AdRecord::default()
        }];
        let summary = summarize(&dataset(records), &Thresholds::default()).unwrap();
        assert!(summary.time_analysis.is_none());
        assert!(summary.creative_analysis.is_none());
        assert!(summary.overview.date_range.is_none());
        assert_eq!(summary.campaign_breakdown.total_campaigns, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["time_analysis"].is_null());
    }
}
