use adsage_contracts::{Evaluation, HypothesisSet, Stage};
use adsage_data::{DataSummary, QuantitativeChecks};
use adsage_llm::{GenerationRequest, SamplingParams};
use adsage_normalize::EvaluationContract;

use crate::prompts;
use crate::stage::StageAdapter;
use crate::timestamp;

const SAMPLING: SamplingParams = SamplingParams::new(0.3, 2000);

pub const FALLBACK_SUMMARY: &str = "Automated validation failed";

pub struct EvaluationInput<'a> {
    pub hypotheses: &'a HypothesisSet,
    pub summary: &'a DataSummary,
    pub checks: &'a QuantitativeChecks,
}

/// Validates hypotheses against the data and adjusts their confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatorStage;

impl StageAdapter for EvaluatorStage {
    type Output = Evaluation;
    type Contract = EvaluationContract;
    type Input<'a> = EvaluationInput<'a>;

    const STAGE: Stage = Stage::Evaluate;

    fn request(&self, input: &EvaluationInput<'_>) -> GenerationRequest {
        GenerationRequest::new(
            Stage::Evaluate,
            prompts::EVALUATOR_SYSTEM,
            prompts::evaluation_message(input.hypotheses, input.summary, input.checks),
            SAMPLING,
        )
    }

    fn complete(&self, mut evaluation: Evaluation, input: &EvaluationInput<'_>) -> Evaluation {
        if evaluation.timestamp.is_empty() {
            evaluation.timestamp = if input.hypotheses.timestamp.is_empty() {
                timestamp()
            } else {
                input.hypotheses.timestamp.clone()
            };
        }
        evaluation.recompute_confidence();
        evaluation
    }

    /// The input hypotheses, unvalidated, with their mean as overall confidence.
    fn fallback(&self, input: &EvaluationInput<'_>) -> Evaluation {
        Evaluation::unvalidated(input.hypotheses, FALLBACK_SUMMARY)
    }
}
