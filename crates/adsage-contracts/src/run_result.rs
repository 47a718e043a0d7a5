use serde::{Deserialize, Serialize};

use crate::{CreativeSet, Evaluation, Plan};

/// Terminal artifact of one pipeline run.
///
/// Built and owned by the pipeline controller while the run is in progress and
/// handed to the caller by value once finished. Failure is expressed through
/// content: empty collections, zero confidence and an explanatory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub plan: Plan,
    pub insights: Evaluation,
    pub creatives: CreativeSet,
    pub report: String,
}

impl RunResult {
    /// Safe terminal result for a run that could not complete.
    #[must_use]
    pub fn failed(query: &str, timestamp: &str, reason: &str) -> Self {
        let message = format!("Analysis failed: {reason}");
        Self {
            plan: Plan::empty(query),
            insights: Evaluation::empty(timestamp, message.clone()),
            creatives: CreativeSet::empty(timestamp, None),
            report: message,
        }
    }

    /// Whether this is the degraded result of a failed run.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.plan.tasks.is_empty() && self.report.starts_with("Analysis failed:")
    }
}
