//! Per-contract pattern specs and shape-correction rule lists.

mod creatives;
mod evaluation;
mod hypotheses;
mod plan;

pub use creatives::CreativesContract;
pub use evaluation::EvaluationContract;
pub use hypotheses::HypothesesContract;
pub use plan::PlanContract;
