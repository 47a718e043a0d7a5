use adsage_contracts::{DEFAULT_QUERY, Intent, Plan, Stage, Task};
use adsage_llm::{GenerationRequest, SamplingParams};
use adsage_normalize::PlanContract;

use crate::prompts;
use crate::stage::StageAdapter;

const SAMPLING: SamplingParams = SamplingParams::new(0.1, 1000);

/// Decomposes the user's question into analysis tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanStage;

impl StageAdapter for PlanStage {
    type Output = Plan;
    type Contract = PlanContract;
    type Input<'a> = &'a str;

    const STAGE: Stage = Stage::Plan;

    fn request(&self, query: &&str) -> GenerationRequest {
        GenerationRequest::new(
            Stage::Plan,
            prompts::PLAN_SYSTEM,
            prompts::plan_message(query),
            SAMPLING,
        )
        .with_json_mode(true)
    }

    fn complete(&self, mut plan: Plan, query: &&str) -> Plan {
        if plan.query.trim().is_empty() || plan.query == DEFAULT_QUERY {
            plan.query = (*query).to_string();
        }
        plan
    }

    fn fallback(&self, query: &&str) -> Plan {
        fallback_plan(query)
    }
}

/// Plan chosen by keywords in the query.
#[must_use]
pub fn fallback_plan(query: &str) -> Plan {
    let lowered = query.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    let (intent, tasks) = if mentions(&["drop", "decline", "decrease"]) {
        (
            Intent::DiagnoseDrop,
            vec![
                Task::new(
                    "T1",
                    "Analyze ROAS trend over time",
                    &["date", "roas", "spend", "revenue"],
                    "Time-based ROAS pattern showing the decline",
                ),
                Task::new(
                    "T2",
                    "Identify underperforming campaigns",
                    &["campaign_name", "roas", "ctr", "spend"],
                    "Campaigns with low ROAS",
                ),
                Task::new(
                    "T3",
                    "Analyze creative performance",
                    &["creative_type", "creative_message", "ctr", "roas"],
                    "Creative types and messages driving the decline",
                ),
            ],
        )
    } else if mentions(&["improve", "increase", "optimize"]) {
        (
            Intent::OptimizePerformance,
            vec![
                Task::new(
                    "T1",
                    "Find top performing campaigns",
                    &["campaign_name", "roas", "ctr", "spend"],
                    "Best performing campaigns to scale",
                ),
                Task::new(
                    "T2",
                    "Identify winning creative patterns",
                    &["creative_type", "creative_message", "ctr"],
                    "Creative elements that drive performance",
                ),
            ],
        )
    } else {
        (
            Intent::GeneralAnalysis,
            vec![
                Task::new(
                    "T1",
                    "Overall performance analysis",
                    &["spend", "revenue", "roas", "ctr"],
                    "Summary of key metrics",
                ),
                Task::new(
                    "T2",
                    "Campaign comparison",
                    &["campaign_name", "roas", "spend"],
                    "Campaign performance breakdown",
                ),
            ],
        )
    };

    Plan {
        query: query.to_string(),
        intent: intent.to_string(),
        tasks,
        success_criteria: format!("Provide actionable insights for: {query}"),
    }
}
