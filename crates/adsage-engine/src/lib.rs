//! Analysis engine for adsage
//!
//! Stage adapters wrap each generation call with normalization and a
//! deterministic fallback, the confidence gate decides on a single reflection
//! pass, and [`Pipeline`] sequences everything into a [`RunResult`].
//!
//! [`RunResult`]: adsage_contracts::RunResult

mod gate;
mod outcome;
mod pipeline;
pub mod prompts;
mod report;
mod stage;
pub mod stages;

pub use gate::{aggregate_confidence, needs_retry};
pub use outcome::{FallbackReason, StageOutcome};
pub use pipeline::Pipeline;
pub use report::{Report, confidence_badge, render_report};
pub use stage::{StageAdapter, invoke};

/// RFC 3339 timestamp for generated artifacts.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
