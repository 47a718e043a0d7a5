use adsage_contracts::{Evaluation, Hypothesis, HypothesisSet, Plan, Stage};
use adsage_data::DataSummary;
use adsage_llm::{GenerationRequest, SamplingParams};
use adsage_normalize::HypothesesContract;

use crate::prompts;
use crate::stage::StageAdapter;
use crate::timestamp;

const SAMPLING: SamplingParams = SamplingParams::new(0.7, 2000);

pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_CATEGORY: &str = "technical";

pub struct InsightInput<'a> {
    pub query: &'a str,
    pub summary: &'a DataSummary,
    pub plan: &'a Plan,
    /// Low-confidence evaluation being reflected on.
    pub previous: Option<&'a Evaluation>,
}

/// Generates hypotheses explaining the observed performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightStage;

impl StageAdapter for InsightStage {
    type Output = HypothesisSet;
    type Contract = HypothesesContract;
    type Input<'a> = InsightInput<'a>;

    const STAGE: Stage = Stage::Hypothesize;

    fn request(&self, input: &InsightInput<'_>) -> GenerationRequest {
        GenerationRequest::new(
            Stage::Hypothesize,
            prompts::INSIGHT_SYSTEM,
            prompts::insight_message(input.query, input.summary, input.plan, input.previous),
            SAMPLING,
        )
    }

    fn complete(&self, mut set: HypothesisSet, input: &InsightInput<'_>) -> HypothesisSet {
        if set.timestamp.is_empty() {
            set.timestamp = timestamp();
        }
        if set.query.is_empty() {
            set.query = input.query.to_string();
        }
        set
    }

    fn fallback(&self, input: &InsightInput<'_>) -> HypothesisSet {
        HypothesisSet {
            timestamp: timestamp(),
            query: input.query.to_string(),
            hypotheses: vec![Hypothesis {
                id: "H1".to_string(),
                hypothesis: "Performance metrics require detailed analysis".to_string(),
                confidence: FALLBACK_CONFIDENCE,
                evidence: vec!["Automated analysis unavailable".to_string()],
                recommendation: "Manual review recommended".to_string(),
                category: FALLBACK_CATEGORY.to_string(),
            }],
            reasoning: "Fallback used: hypotheses could not be generated".to_string(),
        }
    }
}
