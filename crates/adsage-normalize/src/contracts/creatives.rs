use adsage_contracts::{ContractViolation, CreativeSet};
use serde_json::{Map, Value};

use crate::rules::{self, ShapeRule};
use crate::{Contract, PatternSpec};

const LIST: &str = "recommendations";
const ALIASES: &[&str] = &["creative_recommendations", "campaigns", "suggestions"];
const WRAPPERS: &[&str] = &["creatives", "result", "data", "response", "output"];
const LIST_KEYS: &[&str] = &[
    "recommendations",
    "creative_recommendations",
    "campaigns",
    "suggestions",
];
const IDEA_FIELDS: [&str; 6] = [
    "headline",
    "message",
    "cta",
    "creative_type",
    "rationale",
    "inspiration",
];

pub struct CreativesContract;

impl Contract for CreativesContract {
    type Output = CreativeSet;

    const NAME: &'static str = CreativeSet::CONTRACT;
    const LIST_KEY: &'static str = LIST;
    const PATTERN: PatternSpec = PatternSpec {
        list_keys: LIST_KEYS,
        id_key: "campaign_name",
        id_prefix: "Campaign ",
        scalar_fields: &["timestamp", "note"],
    };
    const RULES: &'static [ShapeRule] = &[
        ShapeRule { name: "unwrap_wrapper", apply: unwrap },
        ShapeRule { name: "rename_list_alias", apply: rename },
        ShapeRule { name: "scalar_campaigns", apply: scalar_campaigns },
        ShapeRule { name: "drop_non_objects", apply: drop_non_objects },
        ShapeRule { name: "coerce_campaign_fields", apply: coerce_campaign_fields },
        ShapeRule { name: "coerce_creative_ideas", apply: coerce_creative_ideas },
        ShapeRule { name: "backfill_set_fields", apply: backfill_set_fields },
    ];

    fn check(output: &CreativeSet) -> Result<(), ContractViolation> {
        output.check()
    }
}

fn unwrap(value: Value) -> Value {
    rules::unwrap_wrapper(value, LIST_KEYS, WRAPPERS)
}

fn rename(value: Value) -> Value {
    rules::rename_list_alias(value, LIST, ALIASES)
}

fn scalar_campaigns(value: Value) -> Value {
    rules::map_list(value, LIST, |items| rules::scalars_to_objects(items, "campaign_name"))
}

fn drop_non_objects(value: Value) -> Value {
    rules::map_list(value, LIST, rules::drop_non_objects)
}

fn coerce_campaign_fields(value: Value) -> Value {
    rules::map_items(value, LIST, |index, mut campaign| {
        rules::coerce_text(&mut campaign, "campaign_name", &["campaign", "name"]);
        rules::backfill_text(&mut campaign, "campaign_name", &format!("Campaign {}", index + 1));
        rules::coerce_probability(&mut campaign, "current_ctr", 0.0);
        rules::coerce_text(&mut campaign, "current_message", &["message"]);
        rules::backfill_text(&mut campaign, "current_message", "");
        rules::coerce_text(&mut campaign, "issue", &["problem"]);
        rules::backfill_text(&mut campaign, "issue", "Low CTR");
        campaign
    })
}

fn coerce_creative_ideas(value: Value) -> Value {
    rules::map_items(value, LIST, |_, mut campaign| {
        let raw = ["new_creatives", "creatives", "ideas", "variations"]
            .iter()
            .find_map(|key| campaign.get(*key).filter(|v| !v.is_null()).cloned());
        let ideas: Vec<Value> = match raw {
            Some(Value::Array(items)) => items,
            Some(single @ Value::Object(_)) => vec![single],
            Some(Value::String(s)) => vec![Value::String(s)],
            _ => Vec::new(),
        };
        let ideas = rules::drop_non_objects(rules::scalars_to_objects(ideas, "headline"))
            .into_iter()
            .filter_map(|idea| match idea {
                Value::Object(fields) => Some(Value::Object(coerce_idea(fields))),
                _ => None,
            })
            .collect();
        campaign.insert("new_creatives".to_string(), Value::Array(ideas));
        campaign
    })
}

fn coerce_idea(mut idea: Map<String, Value>) -> Map<String, Value> {
    rules::coerce_text(&mut idea, "headline", &["title"]);
    rules::coerce_text(&mut idea, "message", &["body", "primary_text", "copy"]);
    rules::coerce_text(&mut idea, "cta", &["call_to_action"]);
    rules::coerce_text(&mut idea, "creative_type", &["type", "format"]);
    rules::coerce_text(&mut idea, "rationale", &["reason", "why"]);
    rules::coerce_text(&mut idea, "inspiration", &[]);
    for key in IDEA_FIELDS {
        rules::backfill_text(&mut idea, key, "");
    }
    idea
}

fn backfill_set_fields(value: Value) -> Value {
    let value = rules::ensure_top_level_string(value, "timestamp");
    let Value::Object(mut map) = value else {
        return value;
    };
    if !map.get("note").is_some_and(Value::is_string) {
        map.remove("note");
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use crate::{CreativesContract, normalize};

    #[test]
    fn test_loose_campaign_entries() {
        let set = normalize::<CreativesContract>(
            r#"{"campaigns": [
                {"campaign": "Spring Sale", "current_ctr": "0.8%", "ideas": {"headline": "Fresh Looks", "type": "Video"}},
                "Winter Promo"
            ], "note": 5}"#,
        )
        .unwrap();
        assert_eq!(set.recommendations.len(), 2);
        let first = &set.recommendations[0];
        assert_eq!(first.campaign_name, "Spring Sale");
        assert!((first.current_ctr - 0.008).abs() < 1e-12);
        assert_eq!(first.issue, "Low CTR");
        assert_eq!(first.new_creatives.len(), 1);
        assert_eq!(first.new_creatives[0].creative_type, "Video");
        assert_eq!(first.new_creatives[0].cta, "");

        let second = &set.recommendations[1];
        assert_eq!(second.campaign_name, "Winter Promo");
        assert!(second.new_creatives.is_empty());
        assert!(set.note.is_none());
    }

    #[test]
    fn test_wrapped_creatives() {
        let set = normalize::<CreativesContract>(
            "```json\n{\"creatives\": {\"recommendations\": [{\"campaign_name\": \"A\", \"new_creatives\": [\"Try bold colors\"]}]}}\n```",
        )
        .unwrap();
        assert_eq!(set.recommendations[0].new_creatives[0].headline, "Try bold colors");
    }
}
