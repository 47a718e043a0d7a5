//! Segment selection for the creative stage

use adsage_config::Thresholds;
use serde::Serialize;
use std::collections::HashMap;

use crate::record::{AdRecord, Dataset};
use crate::stats::mean;
use crate::summary::{GroupStats, group_stats};

const MAX_TARGET_CAMPAIGNS: usize = 10;
const MAX_THEMES: usize = 10;

/// High performers clear the low-CTR threshold by this factor.
const HIGH_PERFORMER_FACTOR: f64 = 1.5;

const STOPWORDS: [&str; 11] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
];

/// A low-CTR campaign aggregated over its qualifying rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSnapshot {
    pub campaign_name: String,
    /// Mean CTR of the qualifying rows.
    pub ctr: f64,
    /// Total spend of the qualifying rows.
    pub spend: f64,
    pub roas: f64,
    /// Message and type of the first qualifying row.
    pub creative_message: String,
    pub creative_type: String,
}

/// What the high-CTR rows have in common.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessfulPatterns {
    pub best_creative_types: Vec<GroupStats>,
    pub top_themes: Vec<String>,
    pub avg_high_ctr: f64,
    pub avg_high_roas: f64,
}

/// Campaigns whose rows with at least `min_spend` have CTR below `low_ctr`,
/// highest spend first, at most ten.
#[must_use]
pub fn low_ctr_campaigns(dataset: &Dataset, thresholds: &Thresholds) -> Vec<CampaignSnapshot> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AdRecord>> = HashMap::new();
    for record in dataset
        .records()
        .iter()
        .filter(|r| r.spend >= thresholds.min_spend && r.ctr < thresholds.low_ctr)
    {
        let name = record.campaign_name.as_str();
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(record);
    }

    // Name order first so equal spend ties are deterministic.
    order.sort_unstable();

    let mut campaigns: Vec<CampaignSnapshot> = order
        .into_iter()
        .filter_map(|name| {
            let rows = groups.get(name)?;
            let first = rows.first()?;
            let ctr: Vec<f64> = rows.iter().map(|r| r.ctr).collect();
            let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
            Some(CampaignSnapshot {
                campaign_name: name.to_string(),
                ctr: mean(&ctr),
                spend: rows.iter().map(|r| r.spend).sum(),
                roas: mean(&roas),
                creative_message: first.creative_message.clone(),
                creative_type: first.creative_type.clone(),
            })
        })
        .collect();

    campaigns.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    campaigns.truncate(MAX_TARGET_CAMPAIGNS);
    campaigns
}

/// Patterns among rows with CTR of at least 1.5 times `low_ctr`, or `None`
/// when there are no such rows.
#[must_use]
pub fn successful_patterns(dataset: &Dataset, thresholds: &Thresholds) -> Option<SuccessfulPatterns> {
    let high_threshold = thresholds.low_ctr * HIGH_PERFORMER_FACTOR;
    let high: Vec<AdRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.ctr >= high_threshold)
        .cloned()
        .collect();
    if high.is_empty() {
        return None;
    }

    let ctr: Vec<f64> = high.iter().map(|r| r.ctr).collect();
    let roas: Vec<f64> = high.iter().map(|r| r.roas).collect();

    Some(SuccessfulPatterns {
        best_creative_types: group_stats(&high, |r| &r.creative_type),
        top_themes: top_themes(high.iter().map(|r| r.creative_message.as_str())),
        avg_high_ctr: mean(&ctr),
        avg_high_roas: mean(&roas),
    })
}

/// Most frequent message words longer than three characters, excluding
/// stopwords. Equal counts keep first-seen order.
fn top_themes<'a>(messages: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for word in messages.flat_map(str::split_whitespace) {
        let word = word.to_lowercase();
        if word.chars().count() <= 3 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        match counts.iter_mut().find(|(w, _)| *w == word) {
            Some((_, count)) => *count += 1,
            None => counts.push((word, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(MAX_THEMES).map(|(w, _)| w).collect()
}
