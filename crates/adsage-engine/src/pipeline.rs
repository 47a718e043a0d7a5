//! Pipeline controller
//!
//! Runs one analysis as a fixed sequence of steps:
//! plan, summarize, hypothesize, evaluate, at most one reflection pass,
//! recommend and report. Stage failures are absorbed by the stage adapters; any
//! other fault after the data precondition ends the run with
//! [`RunResult::failed`] instead of an error.

use std::sync::Arc;

use adsage_config::Config;
use adsage_contracts::{CreativeSet, Evaluation, Plan, RunResult};
use adsage_data::{
    DataError, DataSummary, Dataset, QuantitativeChecks, ensure_critical_columns,
    low_ctr_campaigns, successful_patterns, summarize,
};
use adsage_llm::GenerationBackend;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::gate::{aggregate_confidence, needs_retry};
use crate::report::render_report;
use crate::stage::invoke;
use crate::stages::{
    CreativeInput, CreativeStage, EvaluationInput, EvaluatorStage, InsightInput, InsightStage,
    NO_TARGETS_NOTE, PlanStage,
};
use crate::timestamp;

/// Fault in a step that has no fallback.
#[derive(Debug, Error)]
enum StageFailure {
    #[error("data summary unavailable: {0}")]
    Summarize(#[source] DataError),
}

/// Sequences the stages of one analysis run.
///
/// Holds only read-only state; each call to [`Pipeline::run`] builds its own
/// values and shares nothing with concurrent runs.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<Config>,
    backend: Arc<dyn GenerationBackend>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: Arc<Config>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { config, backend }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze `dataset` to answer `query`.
    ///
    /// # Errors
    ///
    /// Returns `DataError::MissingRequiredData` when a critical metric column
    /// is absent. Nothing is generated in that case. Every later failure is
    /// reported through the returned [`RunResult`].
    pub async fn run(
        &self,
        query: impl Into<String>,
        dataset: Arc<Dataset>,
    ) -> Result<RunResult, DataError> {
        let query = query.into();
        ensure_critical_columns(&dataset)?;

        info!(
            provider = self.backend.name(),
            rows = dataset.len(),
            reflection = self.config.agents.reflection_enabled,
            "Starting analysis"
        );

        let config = Arc::clone(&self.config);
        let backend = Arc::clone(&self.backend);
        let task_query = query.clone();
        let task = tokio::spawn(async move {
            execute(&config, backend.as_ref(), &task_query, &dataset).await
        });

        let result = match task.await {
            Ok(Ok(result)) => result,
            Ok(Err(failure)) => {
                error!(error = %failure, "Analysis failed");
                RunResult::failed(&query, &timestamp(), &failure.to_string())
            }
            Err(join_error) => {
                error!(error = %join_error, "Analysis aborted");
                RunResult::failed(&query, &timestamp(), "internal fault during analysis")
            }
        };
        Ok(result)
    }
}

async fn execute(
    config: &Config,
    backend: &dyn GenerationBackend,
    query: &str,
    dataset: &Dataset,
) -> Result<RunResult, StageFailure> {
    let plan = invoke(&PlanStage, backend, &query).await.into_value();
    info!(intent = %plan.intent, tasks = plan.tasks.len(), "Plan ready");

    let summary = summarize(dataset, &config.thresholds).map_err(StageFailure::Summarize)?;
    let checks = summary.quantitative_checks();
    info!(
        rows = summary.overview.total_rows,
        campaigns = summary.overview.unique_campaigns,
        "Data summarized"
    );

    let context = AnalysisContext {
        backend,
        query,
        summary: &summary,
        checks: &checks,
        plan: &plan,
    };

    let mut insights = context.analyze(None).await.evaluation;
    if needs_retry(&insights, &config.agents) {
        info!(
            overall_confidence = aggregate_confidence(&insights),
            min_confidence = config.agents.min_confidence,
            hypotheses = insights.hypotheses.len(),
            "Confidence below threshold, reflecting once"
        );
        let reflection = context.analyze(Some(&insights)).await;
        if reflection.degraded {
            warn!("Reflection pass fell back, keeping the first evaluation");
        } else {
            insights = reflection.evaluation;
        }
    } else {
        info!(
            overall_confidence = aggregate_confidence(&insights),
            "Confidence accepted"
        );
    }
    insights.recompute_confidence();

    let creatives = recommend(config, backend, dataset, &insights).await;
    let report = render_report(query, &insights, &creatives);

    info!(
        hypotheses = insights.hypotheses.len(),
        overall_confidence = insights.overall_confidence,
        recommendations = creatives.recommendations.len(),
        "Analysis complete"
    );

    Ok(RunResult {
        plan,
        insights,
        creatives,
        report,
    })
}

/// Inputs shared by the hypothesize/evaluate pair.
struct AnalysisContext<'a> {
    backend: &'a dyn GenerationBackend,
    query: &'a str,
    summary: &'a DataSummary,
    checks: &'a QuantitativeChecks,
    plan: &'a Plan,
}

struct AnalysisPass {
    evaluation: Evaluation,
    /// Either stage used its fallback.
    degraded: bool,
}

impl AnalysisContext<'_> {
    async fn analyze(&self, previous: Option<&Evaluation>) -> AnalysisPass {
        let hypotheses = invoke(
            &InsightStage,
            self.backend,
            &InsightInput {
                query: self.query,
                summary: self.summary,
                plan: self.plan,
                previous,
            },
        )
        .await;

        let evaluation = invoke(
            &EvaluatorStage,
            self.backend,
            &EvaluationInput {
                hypotheses: hypotheses.value(),
                summary: self.summary,
                checks: self.checks,
            },
        )
        .await;

        AnalysisPass {
            degraded: hypotheses.is_recovered() || evaluation.is_recovered(),
            evaluation: evaluation.into_value(),
        }
    }
}

async fn recommend(
    config: &Config,
    backend: &dyn GenerationBackend,
    dataset: &Dataset,
    insights: &Evaluation,
) -> CreativeSet {
    let targets = low_ctr_campaigns(dataset, &config.thresholds);
    if targets.is_empty() {
        info!("No low-CTR campaigns, skipping creative generation");
        return CreativeSet::empty(timestamp(), Some(NO_TARGETS_NOTE.to_string()));
    }

    let patterns = successful_patterns(dataset, &config.thresholds);
    invoke(
        &CreativeStage,
        backend,
        &CreativeInput {
            targets: &targets,
            patterns: patterns.as_ref(),
            insights,
        },
    )
    .await
    .into_value()
}
