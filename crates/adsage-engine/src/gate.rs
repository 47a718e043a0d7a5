//! Confidence gate deciding whether a reflection pass is warranted

use adsage_config::AgentSettings;
use adsage_contracts::Evaluation;

/// Mean of per-hypothesis confidences, ignoring `overall_confidence`.
#[must_use]
pub fn aggregate_confidence(evaluation: &Evaluation) -> f64 {
    evaluation.mean_confidence()
}

/// Whether the run should reflect on `evaluation`.
///
/// True only when reflection is enabled and the evaluation is either empty or
/// its aggregate confidence is strictly below `min_confidence`.
#[must_use]
pub fn needs_retry(evaluation: &Evaluation, agents: &AgentSettings) -> bool {
    if !agents.reflection_enabled {
        return false;
    }
    evaluation.hypotheses.is_empty() || aggregate_confidence(evaluation) < agents.min_confidence
}
