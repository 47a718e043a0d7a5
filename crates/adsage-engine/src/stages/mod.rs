//! Stage adapters for the generated pipeline steps

mod creative;
mod evaluator;
mod insight;
mod planner;

pub use creative::{CreativeInput, CreativeStage, FALLBACK_NOTE, NO_TARGETS_NOTE};
pub use evaluator::{EvaluationInput, EvaluatorStage, FALLBACK_SUMMARY};
pub use insight::{FALLBACK_CATEGORY, FALLBACK_CONFIDENCE, InsightInput, InsightStage};
pub use planner::{PlanStage, fallback_plan};
