//! Building blocks for shape-correction rules.
//!
//! Every helper is a total `Value -> Value` transform that leaves already
//! well-formed input unchanged, so applying a rule list twice gives the same
//! result as applying it once.

use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// A named, ordered correction step.
#[derive(Clone, Copy)]
pub struct ShapeRule {
    pub name: &'static str,
    pub apply: fn(Value) -> Value,
}

impl std::fmt::Debug for ShapeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShapeRule").field(&self.name).finish()
    }
}

/// Run `rules` in order, logging each one that changed the value.
pub fn apply_rules(contract: &str, rules: &[ShapeRule], mut value: Value) -> Value {
    for rule in rules {
        let before = tracing::enabled!(tracing::Level::DEBUG).then(|| value.clone());
        value = (rule.apply)(value);
        if let Some(before) = before {
            if before != value {
                tracing::debug!(contract, rule = rule.name, "shape correction applied");
            }
        }
    }
    value
}

fn has_list(map: &Map<String, Value>, list_keys: &[&str]) -> bool {
    list_keys
        .iter()
        .any(|key| matches!(map.get(*key), Some(Value::Array(_))))
}

/// Lift the payload out of one level of wrapping.
///
/// Applies only when no list key holds an array at the top level. A known
/// wrapper key holding an object is unwrapped, as is a lone key whose object
/// value carries the list.
pub fn unwrap_wrapper(value: Value, list_keys: &[&str], wrappers: &[&str]) -> Value {
    let Value::Object(map) = &value else {
        return value;
    };
    if has_list(map, list_keys) {
        return value;
    }

    let inner = wrappers
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::Object(inner)) if has_list(inner, list_keys) => Some(inner.clone()),
            _ => None,
        })
        .or_else(|| {
            if map.len() != 1 {
                return None;
            }
            match map.values().next() {
                Some(Value::Object(inner)) if has_list(inner, list_keys) => Some(inner.clone()),
                _ => None,
            }
        });

    match inner {
        Some(inner) => Value::Object(inner),
        None => value,
    }
}

/// Move an alternate list key to the canonical one when the canonical key is
/// absent or null.
pub fn rename_list_alias(value: Value, canonical: &str, aliases: &[&str]) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if !matches!(map.get(canonical), None | Some(Value::Null)) {
        return Value::Object(map);
    }
    if let Some(alias) = aliases
        .iter()
        .find(|alias| matches!(map.get(**alias), Some(Value::Array(_))))
    {
        if let Some(list) = map.remove(*alias) {
            map.insert(canonical.to_string(), list);
        }
    }
    Value::Object(map)
}

/// Apply `f` to the array under `key`, if there is one.
pub fn map_list(value: Value, key: &str, f: impl FnOnce(Vec<Value>) -> Vec<Value>) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if let Some(Value::Array(items)) = map.get_mut(key) {
        let taken = std::mem::take(items);
        *items = f(taken);
    }
    Value::Object(map)
}

/// Apply `f` to every object element of the array under `key`.
pub fn map_items(value: Value, key: &str, f: impl Fn(usize, Map<String, Value>) -> Map<String, Value>) -> Value {
    map_list(value, key, |items| {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(fields) => Value::Object(f(index, fields)),
                other => other,
            })
            .collect()
    })
}

/// Wrap bare strings and numbers as `{text_field: "..."}`.
pub fn scalars_to_objects(items: Vec<Value>, text_field: &str) -> Vec<Value> {
    items
        .into_iter()
        .map(|item| match scalar_text(&item) {
            Some(text) if !item.is_object() => {
                let mut fields = Map::new();
                fields.insert(text_field.to_string(), Value::String(text));
                Value::Object(fields)
            }
            _ => item,
        })
        .collect()
}

pub fn drop_non_objects(items: Vec<Value>) -> Vec<Value> {
    items.into_iter().filter(Value::is_object).collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Coerce `key` to a string, falling back to the first usable alternate field.
///
/// Numbers and booleans are rendered, arrays are joined with `"; "`, objects and
/// nulls are treated as absent. Alternates are consumed when used.
pub fn coerce_text(fields: &mut Map<String, Value>, key: &str, alternates: &[&str]) {
    let current = fields.get(key).and_then(text_of);
    let text = match current {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => alternates.iter().find_map(|alt| {
            fields
                .get(*alt)
                .and_then(text_of)
                .filter(|text| !text.trim().is_empty())
        }),
    };
    match text {
        Some(text) => {
            fields.insert(key.to_string(), Value::String(text));
        }
        None => {
            if !matches!(fields.get(key), Some(Value::String(_))) {
                fields.remove(key);
            }
        }
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        other => scalar_text(other),
    }
}

/// Coerce `key` to a list of non-empty strings.
///
/// A single string becomes a one-element list, or is split on commas when
/// `split_commas` is set. With `unique`, later duplicates are dropped.
pub fn coerce_string_list(fields: &mut Map<String, Value>, key: &str, split_commas: bool, unique: bool) {
    let raw: Vec<String> = match fields.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) if split_commas => s.split(',').map(str::to_string).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let mut seen = HashSet::new();
    let list: Vec<Value> = raw
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .filter(|item| !unique || seen.insert(item.clone()))
        .map(Value::String)
        .collect();

    fields.insert(key.to_string(), Value::Array(list));
}

/// Bare numbers at or above this are read as percentages.
const PERCENT_SCALE_MIN: f64 = 2.0;

/// Parse a probability from a number or string, clamped to `[0, 1]`.
///
/// `"80%"` and bare numbers in `[2, 100]` are percentages. Bare numbers just
/// above 1 are clamped, not scaled.
pub fn to_probability(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
                None => trimmed.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    let scaled = if (PERCENT_SCALE_MIN..=100.0).contains(&raw) {
        raw / 100.0
    } else {
        raw
    };
    Some(scaled.clamp(0.0, 1.0))
}

/// Replace `key` with its probability value, or `default` when unusable.
pub fn coerce_probability(fields: &mut Map<String, Value>, key: &str, default: f64) {
    let probability = fields.get(key).and_then(to_probability).unwrap_or(default);
    fields.insert(key.to_string(), number(probability));
}

pub fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Give every object in `items` a unique non-empty string id.
///
/// Numeric ids are stringified. Missing, blank, or repeated ids get the first
/// free `<prefix><n>` with `n` starting at the item's one-based position.
pub fn assign_ids(items: Vec<Value>, id_key: &str, prefix: &str) -> Vec<Value> {
    let mut items = items;
    for item in items.iter_mut() {
        if let Value::Object(fields) = item {
            if let Some(Value::Number(n)) = fields.get(id_key) {
                let text = n.to_string();
                fields.insert(id_key.to_string(), Value::String(text));
            }
        }
    }

    let mut taken: HashSet<String> = items
        .iter()
        .filter_map(|item| item.get(id_key)?.as_str())
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
        .collect();
    let mut kept: HashSet<String> = HashSet::new();

    for (index, item) in items.iter_mut().enumerate() {
        let Value::Object(fields) = item else {
            continue;
        };
        let current = fields
            .get(id_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|id| !id.trim().is_empty());
        if let Some(id) = current {
            if kept.insert(id) {
                continue;
            }
        }
        let mut n = index + 1;
        let id = loop {
            let candidate = format!("{prefix}{n}");
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(id.clone());
        kept.insert(id.clone());
        fields.insert(id_key.to_string(), Value::String(id));
    }
    items
}

/// Set `key` to `default` when it is missing, null, or blank.
pub fn backfill_text(fields: &mut Map<String, Value>, key: &str, default: &str) {
    if is_blank(fields.get(key)) || !fields.get(key).is_some_and(Value::is_string) {
        fields.insert(key.to_string(), Value::String(default.to_string()));
    }
}

/// Backfill a top-level string field of the payload object.
pub fn backfill_top_level(value: Value, key: &str, default: &str) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    let text = map.get(key).and_then(scalar_text);
    match text {
        Some(text) if !text.trim().is_empty() => {
            map.insert(key.to_string(), Value::String(text));
        }
        _ => {
            map.insert(key.to_string(), Value::String(default.to_string()));
        }
    }
    Value::Object(map)
}

/// Like [`backfill_top_level`] but allows an empty string to stand.
pub fn ensure_top_level_string(value: Value, key: &str) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    let text = map.get(key).and_then(scalar_text).unwrap_or_default();
    map.insert(key.to_string(), Value::String(text));
    Value::Object(map)
}
