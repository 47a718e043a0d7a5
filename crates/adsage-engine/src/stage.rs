//! The stage adapter seam
//!
//! Every generated stage is one [`StageAdapter`]: it builds the request from
//! its input, finishes a normalized value, and knows its deterministic
//! fallback. [`invoke`] runs the call, normalization and fallback in one
//! place so no stage can return an unnormalized or missing value.

use adsage_contracts::Stage;
use adsage_llm::{GenerationBackend, GenerationRequest};
use adsage_normalize::{Contract, normalize};
use tracing::{debug, info};

use crate::outcome::{FallbackReason, StageOutcome};

pub trait StageAdapter {
    type Output;
    type Contract: Contract<Output = Self::Output>;
    type Input<'a>;

    const STAGE: Stage;

    /// Build the generation request for `input`.
    fn request(&self, input: &Self::Input<'_>) -> GenerationRequest;

    /// Fill run-level fields the generator may have left empty.
    fn complete(&self, output: Self::Output, _input: &Self::Input<'_>) -> Self::Output {
        output
    }

    /// Contract-valid value used when generation or normalization fails.
    fn fallback(&self, input: &Self::Input<'_>) -> Self::Output;
}

/// Run one stage against `backend`.
pub async fn invoke<A: StageAdapter>(
    adapter: &A,
    backend: &dyn GenerationBackend,
    input: &A::Input<'_>,
) -> StageOutcome<A::Output> {
    info!(stage = %A::STAGE, provider = backend.name(), "Stage started");

    let request = adapter.request(input);
    let outcome = match backend.generate(request).await {
        Ok(response) => {
            debug!(
                stage = %A::STAGE,
                chars = response.content.len(),
                "Normalizing generated output"
            );
            match normalize::<A::Contract>(&response.content) {
                Ok(value) => StageOutcome::Success(adapter.complete(value, input)),
                Err(err) => StageOutcome::Recovered {
                    value: adapter.fallback(input),
                    reason: FallbackReason::Malformed(err),
                },
            }
        }
        Err(err) => StageOutcome::Recovered {
            value: adapter.fallback(input),
            reason: FallbackReason::Generation(err),
        },
    };

    outcome.log(A::STAGE);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::PlanStage;
    use adsage_llm::{GenerationError, ScriptedBackend};

    const QUERY: &str = "Why did ROAS drop?";

    #[tokio::test]
    async fn test_invoke_normalizes_generated_output() {
        let backend = ScriptedBackend::new().reply(
            Stage::Plan,
            "Here you go:\n```json\n{\"intent\": \"diagnose_drop\", \"tasks\": [{\"task_id\": \"T1\", \"description\": \"ROAS trend\"}]}\n```",
        );

        let outcome = invoke(&PlanStage, &backend, &QUERY).await;

        assert!(!outcome.is_recovered());
        let plan = outcome.into_value();
        assert_eq!(plan.intent, "diagnose_drop");
        assert_eq!(plan.tasks[0].task_id, "T1");
        assert_eq!(plan.query, QUERY);
        assert_eq!(backend.calls(Stage::Plan), 1);
    }

    #[tokio::test]
    async fn test_invoke_falls_back_on_unusable_text() {
        let backend =
            ScriptedBackend::new().reply(Stage::Plan, "I am unable to produce a plan right now.");

        let outcome = invoke(&PlanStage, &backend, &QUERY).await;

        assert!(matches!(
            outcome,
            StageOutcome::Recovered { reason: FallbackReason::Malformed(_), .. }
        ));
        assert_eq!(outcome.value().intent, "diagnose_drop");
        assert!(outcome.value().check().is_ok());
    }

    #[tokio::test]
    async fn test_invoke_falls_back_on_generation_error() {
        let error = GenerationError::EmptyResponse("groq".to_string());
        let backend = ScriptedBackend::new().fail(Stage::Plan, error.clone());

        let outcome = invoke(&PlanStage, &backend, &QUERY).await;

        match outcome {
            StageOutcome::Recovered { value, reason } => {
                assert_eq!(reason, FallbackReason::Generation(error));
                assert_eq!(value.tasks.len(), 3);
            }
            StageOutcome::Success(_) => panic!("expected fallback"),
        }
    }
}
