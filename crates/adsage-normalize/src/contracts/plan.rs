use adsage_contracts::{
    ContractViolation, DEFAULT_DATA_REQUIREMENTS, DEFAULT_EXPECTED_OUTPUT, DEFAULT_INTENT,
    DEFAULT_QUERY, DEFAULT_SUCCESS_CRITERIA, DEFAULT_TASK_DESCRIPTION, Plan,
};
use serde_json::Value;

use crate::rules::{self, ShapeRule};
use crate::{Contract, PatternSpec};

const LIST: &str = "tasks";
const ALIASES: &[&str] = &["steps", "actions", "subtasks"];
const WRAPPERS: &[&str] = &["plan", "result", "data", "response", "output"];
const LIST_KEYS: &[&str] = &["tasks", "steps", "actions", "subtasks"];

pub struct PlanContract;

impl Contract for PlanContract {
    type Output = Plan;

    const NAME: &'static str = Plan::CONTRACT;
    const LIST_KEY: &'static str = LIST;
    const PATTERN: PatternSpec = PatternSpec {
        list_keys: LIST_KEYS,
        id_key: "task_id",
        id_prefix: "T",
        scalar_fields: &["query", "intent", "success_criteria"],
    };
    const RULES: &'static [ShapeRule] = &[
        ShapeRule { name: "unwrap_wrapper", apply: unwrap },
        ShapeRule { name: "flatten_step_tasks", apply: flatten_step_tasks },
        ShapeRule { name: "rename_list_alias", apply: rename },
        ShapeRule { name: "scalar_tasks", apply: scalar_tasks },
        ShapeRule { name: "drop_non_objects", apply: drop_non_objects },
        ShapeRule { name: "coerce_task_fields", apply: coerce_task_fields },
        ShapeRule { name: "assign_task_ids", apply: assign_task_ids },
        ShapeRule { name: "backfill_task_defaults", apply: backfill_task_defaults },
        ShapeRule { name: "backfill_plan_defaults", apply: backfill_plan_defaults },
    ];

    fn check(output: &Plan) -> Result<(), ContractViolation> {
        output.check()
    }
}

fn unwrap(value: Value) -> Value {
    rules::unwrap_wrapper(value, LIST_KEYS, WRAPPERS)
}

/// `{"steps": [{"tasks": [..]}, ..]}` becomes a flat task list.
fn flatten_step_tasks(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if map.get(LIST).is_some_and(Value::is_array) {
        return Value::Object(map);
    }
    let Some(Value::Array(steps)) = map.get("steps") else {
        return Value::Object(map);
    };
    let nested = steps
        .iter()
        .any(|step| step.get(LIST).is_some_and(Value::is_array));
    if !nested {
        return Value::Object(map);
    }

    let mut tasks = Vec::new();
    for step in steps {
        match step.get(LIST) {
            Some(Value::Array(inner)) => tasks.extend(inner.iter().cloned()),
            _ => tasks.push(step.clone()),
        }
    }
    map.remove("steps");
    map.insert(LIST.to_string(), Value::Array(tasks));
    Value::Object(map)
}

fn rename(value: Value) -> Value {
    rules::rename_list_alias(value, LIST, ALIASES)
}

fn scalar_tasks(value: Value) -> Value {
    rules::map_list(value, LIST, |items| rules::scalars_to_objects(items, "description"))
}

fn drop_non_objects(value: Value) -> Value {
    rules::map_list(value, LIST, rules::drop_non_objects)
}

fn coerce_task_fields(value: Value) -> Value {
    rules::map_items(value, LIST, |_, mut task| {
        rules::coerce_text(
            &mut task,
            "description",
            &["action", "task", "step", "name", "title"],
        );
        rules::coerce_text(&mut task, "expected_output", &["output", "expected"]);
        if task.contains_key("data_requirements") {
            rules::coerce_string_list(&mut task, "data_requirements", true, true);
        }
        task
    })
}

fn assign_task_ids(value: Value) -> Value {
    rules::map_list(value, LIST, |items| rules::assign_ids(items, "task_id", "T"))
}

fn backfill_task_defaults(value: Value) -> Value {
    rules::map_items(value, LIST, |_, mut task| {
        rules::backfill_text(&mut task, "description", DEFAULT_TASK_DESCRIPTION);
        rules::backfill_text(&mut task, "expected_output", DEFAULT_EXPECTED_OUTPUT);
        let empty = task
            .get("data_requirements")
            .and_then(Value::as_array)
            .is_none_or(Vec::is_empty);
        if empty {
            let defaults = DEFAULT_DATA_REQUIREMENTS
                .iter()
                .map(|c| Value::String((*c).to_string()))
                .collect();
            task.insert("data_requirements".to_string(), Value::Array(defaults));
        }
        task
    })
}

fn backfill_plan_defaults(value: Value) -> Value {
    let value = rules::backfill_top_level(value, "query", DEFAULT_QUERY);
    let value = rules::backfill_top_level(value, "intent", DEFAULT_INTENT);
    rules::backfill_top_level(value, "success_criteria", DEFAULT_SUCCESS_CRITERIA)
}
