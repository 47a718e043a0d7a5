use serde::{Deserialize, Serialize};

use crate::{
    ContractViolation, Hypothesis, HypothesisSet, check_confidence, check_unique_ids,
    mean_confidence,
};

/// What the evaluator found for and against a hypothesis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub supports: Vec<String>,
    pub contradicts: Vec<String>,
    pub data_gaps: Vec<String>,
}

/// A hypothesis after validation: the adjusted `confidence` plus the value it
/// had before evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedHypothesis {
    pub id: String,
    pub hypothesis: String,
    pub confidence: f64,
    pub original_confidence: f64,
    pub evidence: Vec<String>,
    pub recommendation: String,
    pub category: String,
    pub validation: Validation,
}

impl ValidatedHypothesis {
    /// Carry a hypothesis over unchanged, with an empty validation record.
    #[must_use]
    pub fn unvalidated(h: &Hypothesis) -> Self {
        Self {
            id: h.id.clone(),
            hypothesis: h.hypothesis.clone(),
            confidence: h.confidence,
            original_confidence: h.confidence,
            evidence: h.evidence.clone(),
            recommendation: h.recommendation.clone(),
            category: h.category.clone(),
            validation: Validation::default(),
        }
    }

    /// The hypothesis fields without validation data.
    #[must_use]
    pub fn to_hypothesis(&self) -> Hypothesis {
        Hypothesis {
            id: self.id.clone(),
            hypothesis: self.hypothesis.clone(),
            confidence: self.confidence,
            evidence: self.evidence.clone(),
            recommendation: self.recommendation.clone(),
            category: self.category.clone(),
        }
    }
}

/// A validated hypothesis set.
///
/// `overall_confidence` is derived state: it is the mean of the member
/// confidences and is recomputed whenever the membership changes. A value
/// claimed by the generator is never kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub timestamp: String,
    pub hypotheses: Vec<ValidatedHypothesis>,
    pub overall_confidence: f64,
    pub validation_summary: String,
}

impl Evaluation {
    pub const CONTRACT: &'static str = "evaluation";

    /// Build an evaluation that passes `set` through without validation.
    #[must_use]
    pub fn unvalidated(set: &HypothesisSet, summary: impl Into<String>) -> Self {
        let mut evaluation = Self {
            timestamp: set.timestamp.clone(),
            hypotheses: set
                .hypotheses
                .iter()
                .map(ValidatedHypothesis::unvalidated)
                .collect(),
            overall_confidence: 0.0,
            validation_summary: summary.into(),
        };
        evaluation.recompute_confidence();
        evaluation
    }

    /// Evaluation with no hypotheses and zero confidence.
    #[must_use]
    pub fn empty(timestamp: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            hypotheses: Vec::new(),
            overall_confidence: 0.0,
            validation_summary: summary.into(),
        }
    }

    #[must_use]
    pub fn mean_confidence(&self) -> f64 {
        mean_confidence(self.hypotheses.iter().map(|h| h.confidence))
    }

    pub fn recompute_confidence(&mut self) {
        self.overall_confidence = self.mean_confidence();
    }

    /// Hypotheses without validation data, for feeding back into generation.
    #[must_use]
    pub fn to_hypotheses(&self) -> Vec<Hypothesis> {
        self.hypotheses
            .iter()
            .map(ValidatedHypothesis::to_hypothesis)
            .collect()
    }

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
            check_confidence(Self::CONTRACT, &h.id, h.original_confidence)?;
        }
        Ok(())
    }
}
