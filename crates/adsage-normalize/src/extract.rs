//! Candidate extraction: locating a structured payload inside raw generated text.
//!
//! Steps, each tried only when the previous one yields nothing parseable:
//! fence stripping, boundary slicing, strict parse, lexical repair, and finally
//! pattern extraction of labeled fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// A fenced block: optional language tag, then the body up to the closing fence.
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*([A-Za-z0-9_+-]*)[^\n`]*\n?(.*?)```").unwrap());

/// `"key": "value"` with JSON escapes inside the value.
static LABELED_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([A-Za-z_][A-Za-z0-9_ ]*)"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap()
});

/// `"key": 12.5` or `"key": 80%`.
static LABELED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([A-Za-z_][A-Za-z0-9_ ]*)"\s*:\s*(-?\d+(?:\.\d+)?)(%?)"#).unwrap()
});

/// `"key": [` opening a labeled list
static LABELED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([A-Za-z_][A-Za-z0-9_ ]*)"\s*:\s*\["#).unwrap());

/// What pattern extraction looks for, per contract.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    /// Canonical list key first, then accepted alternates.
    pub list_keys: &'static [&'static str],
    pub id_key: &'static str,
    pub id_prefix: &'static str,
    /// Top-level string fields worth recovering.
    pub scalar_fields: &'static [&'static str],
}

/// Return the body of the preferred fenced block, or the trimmed text.
///
/// A block tagged `json` wins over untagged ones; otherwise the first block that
/// contains an opening brace. An unterminated fence yields everything after it.
pub fn strip_fences(text: &str) -> &str {
    let blocks: Vec<(&str, &str)> = FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let lang = caps.get(1).map_or("", |m| m.as_str());
            caps.get(2).map(|body| (lang, body.as_str()))
        })
        .collect();

    if !blocks.is_empty() {
        let chosen = blocks
            .iter()
            .find(|(lang, _)| lang.eq_ignore_ascii_case("json"))
            .or_else(|| blocks.iter().find(|(_, body)| body.contains('{')))
            .unwrap_or(&blocks[0]);
        return chosen.1.trim();
    }

    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        let body = rest.find('\n').map_or(rest, |nl| &rest[nl + 1..]);
        return body.trim();
    }

    text.trim()
}

/// Slice from the first `{` to the last `}` inclusive.
pub fn slice_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse `text` as a JSON object. Any other JSON value counts as a failure.
pub fn parse_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Fixed textual repairs applied outside double-quoted strings:
/// single-quoted strings become double-quoted, typographic quotes are
/// straightened, `True`/`False`/`None` become JSON literals, and separators
/// directly before a closing bracket are dropped.
pub fn repair_lexical(text: &str) -> String {
    let straightened: String = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let chars: Vec<char> = straightened.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let end = skip_string(&chars, i, '"');
                out.extend(&chars[i..end]);
                i = end;
            }
            '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != '\'' {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            out.push('\\');
                            out.push(chars[i + 1]);
                            i += 2;
                            continue;
                        }
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                    i += 1;
                }
                out.push('"');
                i += 1;
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    _ => &word,
                });
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

/// Rebuild a minimal object from labeled fields found by pattern matching.
///
/// The first labeled list found (in `spec.list_keys` order) is recovered with a
/// bracket-balanced scan, so an unterminated list yields nothing. Elements that
/// are objects without an identifier get `<prefix><position>`.
pub fn recover_fields(text: &str, spec: &PatternSpec) -> Option<Value> {
    let mut object = Map::new();

    let list = spec
        .list_keys
        .iter()
        .find_map(|key| labeled_list_span(text, key));

    let remainder = match list {
        Some((open, close)) => {
            let items = recover_list_items(&text[open + 1..close], spec);
            if !items.is_empty() {
                object.insert(spec.list_keys[0].to_string(), Value::Array(items));
            }
            format!("{}{}", &text[..open], &text[close + 1..])
        }
        None => text.to_string(),
    };

    for caps in LABELED_STRING.captures_iter(&remainder) {
        let key = &caps[1];
        if spec.scalar_fields.contains(&key) && !object.contains_key(key) {
            object.insert(key.to_string(), Value::String(unescape(&caps[2])));
        }
    }

    (!object.is_empty()).then_some(Value::Object(object))
}

fn recover_list_items(inner: &str, spec: &PatternSpec) -> Vec<Value> {
    let mut items = Vec::new();

    for piece in split_top_level(inner) {
        let item = if piece.starts_with('{') {
            parse_object(piece)
                .or_else(|| parse_object(&repair_lexical(piece)))
                .or_else(|| labeled_pairs(piece))
        } else if piece.starts_with('"') && piece.ends_with('"') && piece.len() >= 2 {
            Some(Value::String(unescape(&piece[1..piece.len() - 1])))
        } else {
            None
        };
        if let Some(item) = item {
            items.push(item);
        }
    }

    for (position, item) in items.iter_mut().enumerate() {
        if let Value::Object(fields) = item {
            if !fields.contains_key(spec.id_key) {
                fields.insert(
                    spec.id_key.to_string(),
                    Value::String(format!("{}{}", spec.id_prefix, position + 1)),
                );
            }
        }
    }

    items
}

/// All scalar `"key": value` pairs in `text`, first occurrence wins.
fn labeled_pairs(text: &str) -> Option<Value> {
    let mut fields = Map::new();
    for caps in LABELED_STRING.captures_iter(text) {
        fields
            .entry(caps[1].to_string())
            .or_insert_with(|| Value::String(unescape(&caps[2])));
    }
    for caps in LABELED_NUMBER.captures_iter(text) {
        let value = if caps[3].is_empty() {
            caps[2]
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        } else {
            Some(Value::String(format!("{}%", &caps[2])))
        };
        if let Some(value) = value {
            fields.entry(caps[1].to_string()).or_insert(value);
        }
    }
    (!fields.is_empty()).then_some(Value::Object(fields))
}

/// Byte offsets of the `[` and matching `]` of the list labeled `key`.
fn labeled_list_span(text: &str, key: &str) -> Option<(usize, usize)> {
    let found = LABELED_LIST
        .captures_iter(text)
        .find(|caps| &caps[1] == key)?
        .get(0)?;
    let open = found.end() - 1;
    let close = matching_bracket(text, open)?;
    Some((open, close))
}

/// Offset of the bracket closing the one at `open`, string-aware.
fn matching_bracket(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[open..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split list contents on commas at nesting depth zero.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (offset, c) in inner.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(inner[start..offset].trim());
                start = offset + 1;
            }
            _ => {}
        }
    }
    pieces.push(inner[start..].trim());
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Index just past the string starting at `start` (which holds `quote`).
fn skip_string(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}
