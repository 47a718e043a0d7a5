use serde::{Deserialize, Serialize};

use crate::ContractViolation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeIdea {
    pub headline: String,
    pub message: String,
    pub cta: String,
    pub creative_type: String,
    pub rationale: String,
    pub inspiration: String,
}

/// New creative directions for one underperforming campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecommendation {
    pub campaign_name: String,
    /// Click-through rate as a fraction (0.012 is 1.2%).
    pub current_ctr: f64,
    pub current_message: String,
    pub issue: String,
    pub new_creatives: Vec<CreativeIdea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeSet {
    pub timestamp: String,
    pub recommendations: Vec<CampaignRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CreativeSet {
    pub const CONTRACT: &'static str = "creatives";

    /// Set with no recommendations. Valid as a stage result when there is
    /// nothing to recommend; never produced by normalization.
    #[must_use]
    pub fn empty(timestamp: impl Into<String>, note: Option<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            recommendations: Vec::new(),
            note,
        }
    }

    /// Normalized sets carry at least one recommendation.
    pub fn check(&self) -> Result<(), ContractViolation> {
        if self.recommendations.is_empty() {
            return Err(ContractViolation::EmptyList {
                contract: Self::CONTRACT,
                key: "recommendations",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_is_omitted_when_absent() {
        let set = CreativeSet::empty("2026-03-01T10:00:00Z", None);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.get("note").is_none());
        assert!(set.check().is_err());

        let parsed: CreativeSet = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, set);
    }
}
