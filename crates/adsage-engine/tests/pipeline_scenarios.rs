//! End-to-end runs of the pipeline against scripted and offline backends.

use std::sync::Arc;

use adsage_config::{Config, DEFAULT_REQUIRED_COLUMNS};
use adsage_contracts::Stage;
use adsage_data::{AdRecord, DataError, Dataset};
use adsage_engine::Pipeline;
use adsage_engine::stages::{FALLBACK_CATEGORY, FALLBACK_CONFIDENCE, FALLBACK_NOTE, NO_TARGETS_NOTE};
use adsage_llm::{
    GenerationBackend, GenerationError, GenerationRequest, GenerationResponse, OfflineBackend,
    ScriptedBackend,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

const QUERY: &str = "Why did ROAS drop last week?";

fn row(day: u32, campaign: &str, spend: f64, ctr: f64, roas: f64, message: &str) -> AdRecord {
    let impressions = 10_000.0;
    AdRecord {
        date: NaiveDate::from_ymd_opt(2025, 3, day),
        campaign_name: campaign.to_string(),
        adset_name: format!("{campaign} Broad"),
        spend,
        impressions,
        clicks: (impressions * ctr).round(),
        ctr,
        purchases: 5.0,
        revenue: spend * roas,
        roas,
        creative_type: "Image".to_string(),
        creative_message: message.to_string(),
        audience_type: "Broad".to_string(),
        platform: "Facebook".to_string(),
        country: "US".to_string(),
    }
}

/// Summer Sale sits below the CTR threshold, Winter Promo well above it.
fn dataset_with_ctr(summer_ctr: f64) -> Dataset {
    let mut records = Vec::new();
    for day in 1..=14 {
        records.push(row(day, "Summer Sale", 150.0, summer_ctr, 1.8, "Beat the heat with summer savings"));
        records.push(row(day, "Winter Promo", 170.0, 0.03, 4.6, "Stay warm with exclusive winter deals"));
    }
    Dataset::new(DEFAULT_REQUIRED_COLUMNS, records)
}

fn dataset() -> Arc<Dataset> {
    Arc::new(dataset_with_ctr(0.008))
}

fn config(reflection_enabled: bool) -> Arc<Config> {
    let mut config = Config::minimal_for_testing();
    config.agents.reflection_enabled = reflection_enabled;
    config.agents.min_confidence = 0.6;
    Arc::new(config)
}

fn pipeline(backend: &Arc<ScriptedBackend>, reflection_enabled: bool) -> Pipeline {
    let backend: Arc<dyn GenerationBackend> = backend.clone();
    Pipeline::new(config(reflection_enabled), backend)
}

fn plan_json() -> String {
    json!({
        "query": QUERY,
        "intent": "diagnose_drop",
        "tasks": [
            {"task_id": "T1", "description": "ROAS trend", "data_requirements": ["date", "roas"], "expected_output": "Trend"},
            {"task_id": "T2", "description": "Creative review", "data_requirements": ["ctr"], "expected_output": "Fatigued creatives"}
        ],
        "success_criteria": "Explain the drop"
    })
    .to_string()
}

fn hypotheses_json(confidences: &[f64]) -> String {
    let hypotheses: Vec<_> = confidences
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "id": format!("H{}", i + 1),
                "hypothesis": format!("Hypothesis {}", i + 1),
                "confidence": c,
                "evidence": ["Summer Sale CTR 0.80%"],
                "recommendation": "Refresh the Summer Sale creative",
                "category": "creative_fatigue"
            })
        })
        .collect();
    json!({"query": QUERY, "hypotheses": hypotheses, "reasoning": "CTR fell"}).to_string()
}

/// Evaluation text that claims a misleading overall confidence.
fn evaluation_json(confidences: &[f64]) -> String {
    let hypotheses: Vec<_> = confidences
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "id": format!("H{}", i + 1),
                "hypothesis": format!("Validated {}", i + 1),
                "confidence": c,
                "original_confidence": c,
                "evidence": ["Summer Sale CTR 0.80%"],
                "recommendation": "Refresh the Summer Sale creative",
                "category": "creative_fatigue",
                "validation": {"supports": ["CTR below 1.5%"], "contradicts": [], "data_gaps": []}
            })
        })
        .collect();
    format!(
        "```json\n{}\n```",
        json!({
            "hypotheses": hypotheses,
            "overall_confidence": 0.99,
            "validation_summary": "Checked against weekly metrics"
        })
    )
}

fn creatives_json() -> String {
    json!({
        "recommendations": [{
            "campaign_name": "Summer Sale",
            "current_ctr": 0.008,
            "current_message": "Beat the heat with summer savings",
            "issue": "Low CTR",
            "new_creatives": [{
                "headline": "Summer Ends Sunday",
                "message": "Last chance for 30% off",
                "cta": "Shop Now",
                "creative_type": "Video",
                "rationale": "Urgency lifted CTR on Winter Promo",
                "inspiration": "Winter Promo"
            }]
        }]
    })
    .to_string()
}

fn assert_contracts_hold(result: &adsage_contracts::RunResult) {
    assert!(result.plan.check().is_ok(), "plan: {:?}", result.plan.check());
    assert!(result.insights.check().is_ok(), "insights: {:?}", result.insights.check());
    assert!(result.creatives.check().is_ok(), "creatives: {:?}", result.creatives.check());
    assert!(!result.report.is_empty());
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_confident_run_does_not_reflect() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.8]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9, 0.8]))
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, true).run(QUERY, dataset()).await.unwrap();

    assert!(!result.is_failed());
    assert_contracts_hold(&result);
    assert_eq!(result.plan.tasks.len(), 2);
    assert_eq!(result.insights.hypotheses[0].hypothesis, "Validated 1");
    assert!(close(result.insights.overall_confidence, 0.85), "claimed 0.99 is recomputed");
    assert_eq!(result.creatives.recommendations[0].new_creatives[0].headline, "Summer Ends Sunday");
    assert!(result.report.contains("Summer Ends Sunday"));
    assert!(result.report.contains(QUERY));

    assert_eq!(backend.calls(Stage::Hypothesize), 1);
    assert_eq!(backend.calls(Stage::Evaluate), 1);
    assert_eq!(backend.calls(Stage::Recommend), 1);
}

#[tokio::test]
async fn test_truncated_hypotheses_fall_back() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(
                Stage::Hypothesize,
                r#"Here is my analysis: {"query": "Why did ROAS drop?", "hypotheses": [{"id": "H1", "hypothesis": "Creative fat"#,
            )
            .fail(Stage::Evaluate, GenerationError::ProviderOutage("503".to_string()))
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, false).run(QUERY, dataset()).await.unwrap();

    assert_contracts_hold(&result);
    assert_eq!(result.insights.hypotheses.len(), 1);
    let only = &result.insights.hypotheses[0];
    assert_eq!(only.id, "H1");
    assert_eq!(only.confidence, FALLBACK_CONFIDENCE);
    assert_eq!(only.category, FALLBACK_CATEGORY);
    assert_eq!(result.insights.validation_summary, "Automated validation failed");
    assert!(close(result.insights.overall_confidence, 0.3));
}

#[tokio::test]
async fn test_mean_at_threshold_is_accepted() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.3]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9, 0.3]))
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, true).run(QUERY, dataset()).await.unwrap();

    assert_eq!(backend.calls(Stage::Hypothesize), 1);
    assert!(close(result.insights.overall_confidence, 0.6));
}

#[tokio::test]
async fn test_low_confidence_reflects_once_with_context() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.2]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9, 0.2]))
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.8]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9, 0.8]))
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, true).run(QUERY, dataset()).await.unwrap();

    assert_eq!(backend.calls(Stage::Hypothesize), 2);
    assert_eq!(backend.calls(Stage::Evaluate), 2);
    assert!(close(result.insights.overall_confidence, 0.85));

    let hypothesize: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.stage == Stage::Hypothesize)
        .collect();
    let first = &hypothesize[0].conversation[0].content;
    let second = &hypothesize[1].conversation[0].content;
    assert!(!first.contains("Previous Attempt (Low Confidence)"));
    assert!(second.contains("Previous Attempt (Low Confidence)"));
}

#[tokio::test]
async fn test_reflection_is_bounded_to_one_pass() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.2]))
            .reply(Stage::Evaluate, evaluation_json(&[0.2]))
            .reply(Stage::Hypothesize, hypotheses_json(&[0.3]))
            .reply(Stage::Evaluate, evaluation_json(&[0.3]))
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9]))
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, true).run(QUERY, dataset()).await.unwrap();

    assert_eq!(backend.calls(Stage::Hypothesize), 2);
    assert_eq!(backend.calls(Stage::Evaluate), 2);
    assert!(close(result.insights.overall_confidence, 0.3), "reflected result is used even when still low");
}

#[tokio::test]
async fn test_failed_reflection_keeps_first_evaluation() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.2]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9, 0.2]))
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.8]))
            .reply(Stage::Evaluate, "I could not evaluate these hypotheses.")
            .reply(Stage::Recommend, creatives_json()),
    );

    let result = pipeline(&backend, true).run(QUERY, dataset()).await.unwrap();

    assert_eq!(backend.calls(Stage::Evaluate), 2);
    assert_eq!(result.insights.hypotheses[0].hypothesis, "Validated 1");
    assert!(close(result.insights.overall_confidence, 0.55));
}

#[tokio::test]
async fn test_missing_roas_column_is_fatal_before_any_call() {
    let backend = Arc::new(ScriptedBackend::new().reply(Stage::Plan, plan_json()));
    let columns: Vec<&str> = DEFAULT_REQUIRED_COLUMNS
        .into_iter()
        .filter(|c| *c != "roas")
        .collect();
    let dataset = Arc::new(Dataset::new(columns, dataset_with_ctr(0.008).records().to_vec()));

    let err = pipeline(&backend, true).run(QUERY, dataset).await.unwrap_err();

    match err {
        DataError::MissingRequiredData { columns } => assert_eq!(columns, ["roas"]),
        other => panic!("expected MissingRequiredData, got {other:?}"),
    }
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_offline_run_uses_every_fallback() {
    let backend: Arc<dyn GenerationBackend> = Arc::new(OfflineBackend);
    let result = Pipeline::new(config(true), backend)
        .run(QUERY, dataset())
        .await
        .unwrap();

    assert!(!result.is_failed());
    assert_contracts_hold(&result);
    assert_eq!(result.plan.intent, "diagnose_drop");
    assert_eq!(result.plan.tasks.len(), 3);
    assert_eq!(result.insights.hypotheses[0].category, FALLBACK_CATEGORY);
    assert_eq!(result.creatives.note.as_deref(), Some(FALLBACK_NOTE));
    assert_eq!(result.creatives.recommendations[0].campaign_name, "Summer Sale");
    assert!(result.report.contains("Discover Something Better"));
}

#[tokio::test]
async fn test_no_low_ctr_campaigns_skips_creative_generation() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9]))
            .reply(Stage::Evaluate, evaluation_json(&[0.9])),
    );

    let result = pipeline(&backend, true)
        .run(QUERY, Arc::new(dataset_with_ctr(0.025)))
        .await
        .unwrap();

    assert_eq!(backend.calls(Stage::Recommend), 0);
    assert!(result.creatives.recommendations.is_empty());
    assert_eq!(result.creatives.note.as_deref(), Some(NO_TARGETS_NOTE));
}

#[tokio::test]
async fn test_empty_dataset_degrades_to_failed_result() {
    let backend = Arc::new(ScriptedBackend::new().reply(Stage::Plan, plan_json()));
    let empty = Arc::new(Dataset::new(DEFAULT_REQUIRED_COLUMNS, Vec::new()));

    let result = pipeline(&backend, true).run(QUERY, empty).await.unwrap();

    assert!(result.is_failed());
    assert_eq!(result.plan.query, QUERY);
    assert!(result.insights.hypotheses.is_empty());
    assert_eq!(result.insights.overall_confidence, 0.0);
    assert!(result.creatives.recommendations.is_empty());
    assert!(result.report.starts_with("Analysis failed:"));
    assert_eq!(backend.calls(Stage::Hypothesize), 0);
}

/// Scripted replies, except that the evaluation call panics.
struct PanicsOnEvaluate(ScriptedBackend);

#[async_trait]
impl GenerationBackend for PanicsOnEvaluate {
    fn name(&self) -> &str {
        "panics-on-evaluate"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        if request.stage == Stage::Evaluate {
            panic!("evaluator crashed");
        }
        self.0.generate(request).await
    }
}

#[tokio::test]
async fn test_stage_panic_yields_failed_result() {
    let backend: Arc<dyn GenerationBackend> = Arc::new(PanicsOnEvaluate(
        ScriptedBackend::new()
            .reply(Stage::Plan, plan_json())
            .reply(Stage::Hypothesize, hypotheses_json(&[0.9, 0.8])),
    ));

    let result = Pipeline::new(config(true), backend)
        .run(QUERY, dataset())
        .await
        .unwrap();

    assert!(result.is_failed());
    assert_eq!(result.report, "Analysis failed: internal fault during analysis");
    assert_eq!(result.plan.query, QUERY);
    assert!(result.insights.hypotheses.is_empty());
    assert!(result.creatives.recommendations.is_empty());
}
