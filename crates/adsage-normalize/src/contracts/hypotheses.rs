use adsage_contracts::{ContractViolation, HypothesisSet};
use serde_json::{Map, Value};

use crate::rules::{self, ShapeRule};
use crate::{Contract, PatternSpec};

pub(crate) const LIST: &str = "hypotheses";
const ALIASES: &[&str] = &["insights", "findings", "results"];
const WRAPPERS: &[&str] = &["insights", "analysis", "result", "data", "response", "output"];
pub(crate) const LIST_KEYS: &[&str] = &["hypotheses", "insights", "findings", "results"];

/// Confidence assumed when a hypothesis carries none.
pub(crate) const DEFAULT_CONFIDENCE: f64 = 0.5;

pub struct HypothesesContract;

impl Contract for HypothesesContract {
    type Output = HypothesisSet;

    const NAME: &'static str = HypothesisSet::CONTRACT;
    const LIST_KEY: &'static str = LIST;
    const PATTERN: PatternSpec = PatternSpec {
        list_keys: LIST_KEYS,
        id_key: "id",
        id_prefix: "H",
        scalar_fields: &["timestamp", "query", "reasoning"],
    };
    const RULES: &'static [ShapeRule] = &[
        ShapeRule { name: "unwrap_wrapper", apply: unwrap },
        ShapeRule { name: "rename_list_alias", apply: rename },
        ShapeRule { name: "scalar_hypotheses", apply: scalar_hypotheses },
        ShapeRule { name: "drop_non_objects", apply: drop_non_objects },
        ShapeRule { name: "coerce_hypothesis_fields", apply: coerce_fields },
        ShapeRule { name: "assign_hypothesis_ids", apply: assign_ids },
        ShapeRule { name: "backfill_hypothesis_defaults", apply: backfill_defaults },
        ShapeRule { name: "backfill_set_fields", apply: backfill_set_fields },
    ];

    fn check(output: &HypothesisSet) -> Result<(), ContractViolation> {
        output.check()
    }
}

pub(crate) fn unwrap(value: Value) -> Value {
    rules::unwrap_wrapper(value, LIST_KEYS, WRAPPERS)
}

pub(crate) fn rename(value: Value) -> Value {
    rules::rename_list_alias(value, LIST, ALIASES)
}

pub(crate) fn scalar_hypotheses(value: Value) -> Value {
    rules::map_list(value, LIST, |items| rules::scalars_to_objects(items, "hypothesis"))
}

pub(crate) fn drop_non_objects(value: Value) -> Value {
    rules::map_list(value, LIST, rules::drop_non_objects)
}

/// Field coercions shared with the evaluation contract.
pub(crate) fn coerce_hypothesis(mut item: Map<String, Value>) -> Map<String, Value> {
    rules::coerce_text(
        &mut item,
        "hypothesis",
        &["text", "statement", "explanation", "description", "title"],
    );
    rules::coerce_probability(&mut item, "confidence", DEFAULT_CONFIDENCE);
    rules::coerce_string_list(&mut item, "evidence", false, false);
    rules::coerce_text(&mut item, "recommendation", &["action", "recommendations"]);
    rules::coerce_text(&mut item, "category", &["type"]);
    item
}

pub(crate) fn backfill_hypothesis(mut item: Map<String, Value>) -> Map<String, Value> {
    rules::backfill_text(&mut item, "hypothesis", "Unspecified hypothesis");
    rules::backfill_text(&mut item, "recommendation", "No recommendation provided");
    rules::backfill_text(&mut item, "category", "general");
    item
}

fn coerce_fields(value: Value) -> Value {
    rules::map_items(value, LIST, |_, item| coerce_hypothesis(item))
}

pub(crate) fn assign_ids(value: Value) -> Value {
    rules::map_list(value, LIST, |items| rules::assign_ids(items, "id", "H"))
}

fn backfill_defaults(value: Value) -> Value {
    rules::map_items(value, LIST, |_, item| backfill_hypothesis(item))
}

fn backfill_set_fields(value: Value) -> Value {
    let value = rules::ensure_top_level_string(value, "timestamp");
    let value = rules::ensure_top_level_string(value, "query");
    rules::ensure_top_level_string(value, "reasoning")
}
