//! Stage boundary contracts for adsage.
//!
//! Every value that crosses a stage boundary in the analysis pipeline is one of
//! the types defined here: a [`Plan`], a [`HypothesisSet`], an [`Evaluation`]
//! or a [`CreativeSet`], assembled at the end into a [`RunResult`]. Raw
//! generated text is coerced into these shapes by `adsage-normalize`; the
//! `check` methods state the invariants a normalized value satisfies.

mod creative;
mod evaluation;
mod hypothesis;
mod plan;
mod run_result;
mod stage;

pub use creative::{CampaignRecommendation, CreativeIdea, CreativeSet};
pub use evaluation::{Evaluation, ValidatedHypothesis, Validation};
pub use hypothesis::{Hypothesis, HypothesisSet};
pub use plan::{
    DEFAULT_DATA_REQUIREMENTS, DEFAULT_EXPECTED_OUTPUT, DEFAULT_INTENT, DEFAULT_QUERY,
    DEFAULT_SUCCESS_CRITERIA, DEFAULT_TASK_DESCRIPTION, Intent, Plan, Task,
};
pub use run_result::RunResult;
pub use stage::Stage;

use std::collections::HashSet;
use thiserror::Error;

/// A normalized value that does not satisfy its contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("{contract}: '{key}' must contain at least one entry")]
    EmptyList {
        contract: &'static str,
        key: &'static str,
    },

    #[error("{contract}: identifier '{id}' is not unique")]
    DuplicateId { contract: &'static str, id: String },

    #[error("{contract}: entry has an empty identifier")]
    EmptyId { contract: &'static str },

    #[error("{contract}: confidence {value} of '{id}' is outside [0, 1]")]
    ConfidenceOutOfRange {
        contract: &'static str,
        id: String,
        value: f64,
    },
}

/// Arithmetic mean of `confidences`, `0.0` for an empty sequence.
#[must_use]
pub fn mean_confidence<I>(confidences: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = confidences
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), c| (sum + c, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub(crate) fn check_unique_ids<'a, I>(contract: &'static str, ids: I) -> Result<(), ContractViolation>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ContractViolation::EmptyId { contract });
        }
        if !seen.insert(id) {
            return Err(ContractViolation::DuplicateId {
                contract,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn check_confidence(
    contract: &'static str,
    id: &str,
    value: f64,
) -> Result<(), ContractViolation> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContractViolation::ConfidenceOutOfRange {
            contract,
            id: id.to_string(),
            value,
        })
    }
}
