//! Behavioral and property tests for output normalization.
//!
//! Property case counts follow `PROPTEST_CASES` (default: 64) and
//! `PROPTEST_MAX_SHRINK_ITERS` (default: 1000).

use adsage_normalize::{
    Contract, CreativesContract, EvaluationContract, HypothesesContract, NormalizeError,
    PlanContract, normalize,
};
use proptest::prelude::*;
use std::env;

const DEFAULT_PROPTEST_CASES: u32 = 64;
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

fn proptest_config(max_cases: Option<u32>) -> ProptestConfig {
    let env_cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);

    let env_shrink_iters = env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_SHRINK_ITERS);

    let cases = match max_cases {
        Some(max) => env_cases.min(max),
        None => env_cases,
    };

    ProptestConfig {
        cases,
        max_shrink_iters: env_shrink_iters,
        max_shrink_time: 30000,
        ..ProptestConfig::default()
    }
}

/// Normalizing the re-encoded output of a successful normalization gives the
/// same value back.
fn assert_idempotent<C: Contract>(raw: &str) -> Result<(), TestCaseError>
where
    C::Output: PartialEq + std::fmt::Debug,
{
    if let Ok(first) = normalize::<C>(raw) {
        let encoded = serde_json::to_string(&first).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = normalize::<C>(&encoded);
        prop_assert_eq!(Ok(first), second);
    }
    Ok(())
}

#[test]
fn test_plan_wrapped_in_extra_layer() {
    let raw = r#"{"plan": {"query": "Why did ROAS drop?", "intent": "diagnose_drop", "tasks": [
        {"task_id": "T1", "description": "Trend", "data_requirements": ["date", "roas"], "expected_output": "Chart"},
        {"task_id": "T2", "description": "Campaigns", "data_requirements": ["campaign_name"], "expected_output": "Table"}
    ], "success_criteria": "Root cause found"}}"#;

    let plan = normalize::<PlanContract>(raw).unwrap();
    assert_eq!(plan.tasks.len(), 2);
    assert_eq!(plan.tasks[0].task_id, "T1");
    assert_eq!(plan.tasks[1].data_requirements, vec!["campaign_name"]);
    assert_eq!(plan.intent, "diagnose_drop");
    assert_eq!(plan.success_criteria, "Root cause found");
}

#[test]
fn test_plan_steps_of_plain_strings() {
    let raw = r#"{"steps": ["Look at the ROAS trend", "Compare campaigns"]}"#;

    let plan = normalize::<PlanContract>(raw).unwrap();
    assert_eq!(plan.tasks.len(), 2);
    assert_eq!(plan.tasks[0].task_id, "T1");
    assert_eq!(plan.tasks[1].task_id, "T2");
    for task in &plan.tasks {
        assert_eq!(task.data_requirements, vec!["spend", "revenue", "roas"]);
    }
}

#[test]
fn test_truncated_hypotheses_are_rejected() {
    let raw = r#"Here is my analysis: {"query": "Why did ROAS drop?", "hypotheses": [{"id": "H1", "hypothesis": "Creative fat"#;
    assert_eq!(
        normalize::<HypothesesContract>(raw),
        Err(NormalizeError::MissingKey { key: "hypotheses" })
    );

    let raw = r#"{"hypotheses": [{"id": "H1", "hypo"#;
    assert_eq!(
        normalize::<HypothesesContract>(raw),
        Err(NormalizeError::NoStructuredPayload)
    );
}

#[test]
fn test_commentary_around_fenced_payload() {
    let raw = "Sure! Based on the data:\n\n```json\n{\n  \"hypotheses\": [\n    {\"id\": \"H1\", \"hypothesis\": \"Audience fatigue\", \"confidence\": 0.72, \"evidence\": [\"Frequency up 2x\"], \"recommendation\": \"Broaden targeting\", \"category\": \"audience\"},\n  ],\n}\n```\n\nLet me know if you need more.";

    let set = normalize::<HypothesesContract>(raw).unwrap();
    assert_eq!(set.hypotheses.len(), 1);
    assert_eq!(set.hypotheses[0].category, "audience");
    assert_eq!(set.hypotheses[0].confidence, 0.72);
}

#[test]
fn test_labeled_field_recovery() {
    let raw = r#"{"query": "Why did ROAS drop?", "hypotheses": [
        {"hypothesis": "Creative fatigue" "confidence": 0.8},
        {"hypothesis": "Audience overlap", "confidence": 65%}
    ], "reasoning": unquoted words here}"#;

    let set = normalize::<HypothesesContract>(raw).unwrap();
    assert_eq!(set.query, "Why did ROAS drop?");
    assert_eq!(set.hypotheses.len(), 2);
    assert_eq!(set.hypotheses[0].id, "H1");
    assert_eq!(set.hypotheses[0].confidence, 0.8);
    assert_eq!(set.hypotheses[1].id, "H2");
    assert_eq!(set.hypotheses[1].confidence, 0.65);
}

#[test]
fn test_evaluation_mean_never_taken_from_payload() {
    let raw = r#"{"hypotheses": [
        {"id": "H1", "hypothesis": "a", "confidence": 0.9},
        {"id": "H2", "hypothesis": "b", "confidence": 0.2}
    ], "overall_confidence": 0.99}"#;

    let evaluation = normalize::<EvaluationContract>(raw).unwrap();
    assert!((evaluation.overall_confidence - 0.55).abs() < 1e-12);
}

#[test]
fn test_creatives_without_recommendations() {
    assert_eq!(
        normalize::<CreativesContract>(r#"{"timestamp": "t", "recommendations": []}"#),
        Err(NormalizeError::EmptySequence { key: "recommendations" })
    );
}

fn arb_loose_confidence() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        (0.0f64..1.0).prop_map(|f| serde_json::json!(f)),
        (0u32..=100).prop_map(|p| serde_json::json!(format!("{p}%"))),
        (-50i64..300).prop_map(|i| serde_json::json!(i)),
        Just(serde_json::Value::Null),
        "[a-z]{0,6}".prop_map(serde_json::Value::String),
    ]
}

fn arb_hypothesis_item() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(serde_json::Value::String),
        (
            prop::option::of(prop_oneof!["H[0-9]".prop_map(|s| serde_json::json!(s)), (0u8..5).prop_map(|n| serde_json::json!(n))]),
            prop::option::of("[a-zA-Z ]{0,20}"),
            arb_loose_confidence(),
            prop::collection::vec("[a-z ]{0,10}", 0..3),
        )
            .prop_map(|(id, text, confidence, evidence)| {
                let mut item = serde_json::Map::new();
                if let Some(id) = id {
                    item.insert("id".into(), id);
                }
                if let Some(text) = text {
                    item.insert("hypothesis".into(), serde_json::json!(text));
                }
                item.insert("confidence".into(), confidence);
                item.insert("evidence".into(), serde_json::json!(evidence));
                serde_json::Value::Object(item)
            }),
    ]
}

/// Render `fields` as generated text: optionally under one wrapper key and
/// inside a fenced block with commentary around it.
fn render_payload(
    fields: serde_json::Map<String, serde_json::Value>,
    wrapper: &str,
    fenced: bool,
) -> String {
    let mut payload = serde_json::Value::Object(fields);
    if !wrapper.is_empty() {
        let mut outer = serde_json::Map::new();
        outer.insert(wrapper.to_string(), payload);
        payload = serde_json::Value::Object(outer);
    }
    let text = payload.to_string();
    if fenced {
        format!("Result:\n```json\n{text}\n```\nDone.")
    } else {
        text
    }
}

fn arb_hypothesis_payload() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(arb_hypothesis_item(), 0..5),
        prop::sample::select(vec!["hypotheses", "insights", "findings"]),
        prop::sample::select(vec!["", "result", "analysis"]),
        any::<bool>(),
    )
        .prop_map(|(items, key, wrapper, fenced)| {
            let mut fields = serde_json::Map::new();
            fields.insert(key.to_string(), serde_json::Value::Array(items));
            fields.insert("query".to_string(), serde_json::json!("q"));
            render_payload(fields, wrapper, fenced)
        })
}

fn arb_task_item() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(serde_json::Value::String),
        (
            prop::option::of(prop_oneof![
                "T[0-9]".prop_map(|s| serde_json::json!(s)),
                (0u8..5).prop_map(|n| serde_json::json!(n)),
                Just(serde_json::json!("")),
            ]),
            prop::sample::select(vec!["description", "action", "title"]),
            prop::option::of("[a-zA-Z ]{0,20}"),
            prop::option::of(prop_oneof![
                prop::collection::vec("[a-z_]{0,8}", 0..4).prop_map(|v| serde_json::json!(v)),
                "[a-z_, ]{0,20}".prop_map(serde_json::Value::String),
            ]),
            prop::option::of("[a-zA-Z ]{0,12}"),
        )
            .prop_map(|(id, text_key, text, requirements, output)| {
                let mut item = serde_json::Map::new();
                if let Some(id) = id {
                    item.insert("task_id".into(), id);
                }
                if let Some(text) = text {
                    item.insert(text_key.into(), serde_json::json!(text));
                }
                if let Some(requirements) = requirements {
                    item.insert("data_requirements".into(), requirements);
                }
                if let Some(output) = output {
                    item.insert("expected_output".into(), serde_json::json!(output));
                }
                serde_json::Value::Object(item)
            }),
    ]
}

fn arb_plan_payload() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(arb_task_item(), 0..5),
        prop::sample::select(vec!["tasks", "steps", "actions", "subtasks"]),
        prop::sample::select(vec!["", "plan", "result"]),
        prop::option::of("[a-z_]{0,12}"),
        any::<bool>(),
    )
        .prop_map(|(items, key, wrapper, intent, fenced)| {
            let mut fields = serde_json::Map::new();
            fields.insert(key.to_string(), serde_json::Value::Array(items));
            fields.insert("query".to_string(), serde_json::json!("q"));
            if let Some(intent) = intent {
                fields.insert("intent".to_string(), serde_json::json!(intent));
            }
            render_payload(fields, wrapper, fenced)
        })
}

fn arb_creative_idea() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[a-zA-Z ]{0,16}".prop_map(serde_json::Value::String),
        (
            prop::sample::select(vec!["headline", "title"]),
            "[a-zA-Z ]{0,16}",
            prop::sample::select(vec!["message", "body", "copy"]),
            prop::option::of("[a-zA-Z ]{0,20}"),
            prop::option::of(prop::sample::select(vec!["Image", "Video", "Carousel"])),
        )
            .prop_map(|(headline_key, headline, message_key, message, kind)| {
                let mut idea = serde_json::Map::new();
                idea.insert(headline_key.into(), serde_json::json!(headline));
                if let Some(message) = message {
                    idea.insert(message_key.into(), serde_json::json!(message));
                }
                if let Some(kind) = kind {
                    idea.insert("type".into(), serde_json::json!(kind));
                }
                serde_json::Value::Object(idea)
            }),
    ]
}

fn arb_campaign_item() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(serde_json::Value::String),
        (
            prop::sample::select(vec!["campaign_name", "campaign", "name"]),
            prop::option::of("[a-zA-Z ]{0,16}"),
            arb_loose_confidence(),
            prop::sample::select(vec!["new_creatives", "ideas", "variations"]),
            prop::collection::vec(arb_creative_idea(), 0..3),
        )
            .prop_map(|(name_key, name, ctr, ideas_key, ideas)| {
                let mut campaign = serde_json::Map::new();
                if let Some(name) = name {
                    campaign.insert(name_key.into(), serde_json::json!(name));
                }
                campaign.insert("current_ctr".into(), ctr);
                campaign.insert(ideas_key.into(), serde_json::Value::Array(ideas));
                serde_json::Value::Object(campaign)
            }),
    ]
}

fn arb_creatives_payload() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(arb_campaign_item(), 0..4),
        prop::sample::select(vec!["recommendations", "campaigns", "suggestions"]),
        prop::sample::select(vec!["", "creatives", "data"]),
        prop::option::of(prop_oneof![
            "[a-zA-Z ]{0,16}".prop_map(serde_json::Value::String),
            (0u8..10).prop_map(|n| serde_json::json!(n)),
        ]),
        any::<bool>(),
    )
        .prop_map(|(items, key, wrapper, note, fenced)| {
            let mut fields = serde_json::Map::new();
            fields.insert(key.to_string(), serde_json::Value::Array(items));
            if let Some(note) = note {
                fields.insert("note".to_string(), note);
            }
            render_payload(fields, wrapper, fenced)
        })
}

#[test]
fn test_deeply_nested_input_is_total() {
    fn normalize_all(raw: &str) {
        let _ = normalize::<PlanContract>(raw);
        let _ = normalize::<HypothesesContract>(raw);
        let _ = normalize::<EvaluationContract>(raw);
        let _ = normalize::<CreativesContract>(raw);
    }

    let depth = 5_000;
    let objects = format!("{}1{}", r#"{"result": "#.repeat(depth), "}".repeat(depth));
    normalize_all(&objects);

    let arrays = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
    normalize_all(&arrays);
    normalize_all(&format!("{{\"tasks\": {arrays}}}"));

    let unterminated = format!(r#"{{"hypotheses": {}"#, "[".repeat(50_000));
    normalize_all(&unterminated);
    assert!(normalize::<HypothesesContract>(&unterminated).is_err());
}

#[test]
fn prop_normalize_is_total() {
    let config = proptest_config(None);

    proptest!(config, |(raw in ".{0,200}")| {
        let _ = normalize::<PlanContract>(&raw);
        let _ = normalize::<HypothesesContract>(&raw);
        let _ = normalize::<EvaluationContract>(&raw);
        let _ = normalize::<CreativesContract>(&raw);
    });
}

#[test]
fn prop_normalize_is_total_on_json_like_text() {
    let config = proptest_config(None);

    proptest!(config, |(raw in r#"[{}\[\]",:'a-z0-9 %\n`]{0,120}"#)| {
        let _ = normalize::<PlanContract>(&raw);
        let _ = normalize::<HypothesesContract>(&raw);
        let _ = normalize::<EvaluationContract>(&raw);
        let _ = normalize::<CreativesContract>(&raw);
    });
}

#[test]
fn prop_hypotheses_satisfy_contract() {
    let config = proptest_config(None);

    proptest!(config, |(raw in arb_hypothesis_payload())| {
        if let Ok(set) = normalize::<HypothesesContract>(&raw) {
            prop_assert!(set.check().is_ok());
            prop_assert!(!set.hypotheses.is_empty());
        }
    });
}

#[test]
fn prop_normalize_is_idempotent() {
    let config = proptest_config(None);

    proptest!(config, |(raw in arb_hypothesis_payload())| {
        assert_idempotent::<HypothesesContract>(&raw)?;
        assert_idempotent::<EvaluationContract>(&raw)?;
    });
}

#[test]
fn prop_plan_normalization_is_idempotent() {
    let config = proptest_config(None);

    proptest!(config, |(raw in arb_plan_payload())| {
        if let Ok(plan) = normalize::<PlanContract>(&raw) {
            prop_assert!(plan.check().is_ok());
        }
        assert_idempotent::<PlanContract>(&raw)?;
    });
}

#[test]
fn prop_creatives_normalization_is_idempotent() {
    let config = proptest_config(None);

    proptest!(config, |(raw in arb_creatives_payload())| {
        if let Ok(set) = normalize::<CreativesContract>(&raw) {
            prop_assert!(set.check().is_ok());
        }
        assert_idempotent::<CreativesContract>(&raw)?;
    });
}
