use adsage_contracts::{ContractViolation, Evaluation};
use serde_json::{Map, Value};

use super::hypotheses::{self, LIST, LIST_KEYS};
use crate::rules::{self, ShapeRule};
use crate::{Contract, PatternSpec};

const VALIDATION_LISTS: [&str; 3] = ["supports", "contradicts", "data_gaps"];

pub struct EvaluationContract;

impl Contract for EvaluationContract {
    type Output = Evaluation;

    const NAME: &'static str = Evaluation::CONTRACT;
    const LIST_KEY: &'static str = LIST;
    const PATTERN: PatternSpec = PatternSpec {
        list_keys: LIST_KEYS,
        id_key: "id",
        id_prefix: "H",
        scalar_fields: &["timestamp", "validation_summary"],
    };
    const RULES: &'static [ShapeRule] = &[
        ShapeRule { name: "unwrap_wrapper", apply: hypotheses::unwrap },
        ShapeRule { name: "rename_list_alias", apply: hypotheses::rename },
        ShapeRule { name: "scalar_hypotheses", apply: hypotheses::scalar_hypotheses },
        ShapeRule { name: "drop_non_objects", apply: hypotheses::drop_non_objects },
        ShapeRule { name: "coerce_validated_fields", apply: coerce_fields },
        ShapeRule { name: "assign_hypothesis_ids", apply: hypotheses::assign_ids },
        ShapeRule { name: "backfill_hypothesis_defaults", apply: backfill_defaults },
        ShapeRule { name: "backfill_summary", apply: backfill_summary },
        ShapeRule { name: "recompute_overall_confidence", apply: recompute_overall },
    ];

    fn check(output: &Evaluation) -> Result<(), ContractViolation> {
        output.check()
    }
}

fn coerce_fields(value: Value) -> Value {
    rules::map_items(value, LIST, |_, item| {
        let claimed_original = item.get("original_confidence").cloned();
        let mut item = hypotheses::coerce_hypothesis(item);
        let original = claimed_original
            .as_ref()
            .and_then(rules::to_probability)
            .or_else(|| item.get("confidence").and_then(Value::as_f64))
            .unwrap_or(hypotheses::DEFAULT_CONFIDENCE);
        item.insert("original_confidence".to_string(), rules::number(original));
        item.insert("validation".to_string(), coerce_validation(item.get("validation")));
        item
    })
}

/// Coerce the validation record, accepting a bare list as `supports`.
fn coerce_validation(value: Option<&Value>) -> Value {
    let mut fields = match value {
        Some(Value::Object(map)) => map.clone(),
        Some(list @ Value::Array(_)) => {
            let mut map = Map::new();
            map.insert("supports".to_string(), list.clone());
            map
        }
        _ => Map::new(),
    };
    for key in VALIDATION_LISTS {
        rules::coerce_string_list(&mut fields, key, false, false);
    }
    fields.retain(|key, _| VALIDATION_LISTS.contains(&key.as_str()));
    Value::Object(fields)
}

fn backfill_defaults(value: Value) -> Value {
    rules::map_items(value, LIST, |_, item| hypotheses::backfill_hypothesis(item))
}

fn backfill_summary(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    let mut summary = Map::new();
    for key in ["validation_summary", "summary", "assessment"] {
        if let Some(v) = map.get(key) {
            summary.insert(key.to_string(), v.clone());
        }
    }
    rules::coerce_text(&mut summary, "validation_summary", &["summary", "assessment"]);
    let text = summary
        .get("validation_summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    map.insert("validation_summary".to_string(), Value::String(text));
    rules::ensure_top_level_string(Value::Object(map), "timestamp")
}

/// The set's overall confidence is always the mean of its members.
fn recompute_overall(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    let confidences: Vec<f64> = map
        .get(LIST)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("confidence").and_then(Value::as_f64))
                .collect()
        })
        .unwrap_or_default();
    let overall = adsage_contracts::mean_confidence(confidences);
    map.insert("overall_confidence".to_string(), rules::number(overall));
    Value::Object(map)
}
