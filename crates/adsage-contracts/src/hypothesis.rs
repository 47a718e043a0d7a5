use serde::{Deserialize, Serialize};

use crate::{ContractViolation, check_confidence, check_unique_ids, mean_confidence};

/// One candidate explanation of the observed performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: String,
    pub hypothesis: String,
    /// Always within `[0, 1]` once normalized.
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub recommendation: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSet {
    pub timestamp: String,
    pub query: String,
    pub hypotheses: Vec<Hypothesis>,
    pub reasoning: String,
}

impl HypothesisSet {
    pub const CONTRACT: &'static str = "hypotheses";

    pub fn check(&self) -> Result<(), ContractViolation> {
        if self.hypotheses.is_empty() {
            return Err(ContractViolation::EmptyList {
                contract: Self::CONTRACT,
                key: "hypotheses",
            });
        }
        check_unique_ids(Self::CONTRACT, self.hypotheses.iter().map(|h| h.id.as_str()))?;
        for h in &self.hypotheses {
            check_confidence(Self::CONTRACT, &h.id, h.confidence)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn mean_confidence(&self) -> f64 {
        mean_confidence(self.hypotheses.iter().map(|h| h.confidence))
    }
}
