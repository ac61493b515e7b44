//! Pulling structured fields out of free-form model output.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tasks::{TaskFields, SENTINEL};

static JSON_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)```").expect("valid json block regex"));

const LEGACY_SENTINEL: &str = "-1";

/// Object inside the first fenced `json` block. Empty when there is no block
/// or it does not hold a JSON object.
pub fn json_block(text: &str) -> Map<String, Value> {
    let Some(body) = JSON_BLOCK.captures(text).and_then(|c| c.get(1)) else {
        tracing::debug!("no json block in model response");
        return Map::new();
    };
    match serde_json::from_str::<Value>(body.as_str()) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "json block is not an object");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "malformed json block in model response");
            Map::new()
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One extracted value as text. Missing, `null` and `-1` become the sentinel.
pub fn field(map: &Map<String, Value>, key: &str) -> String {
    let text = match map.get(key) {
        None | Some(Value::Null) => return SENTINEL.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    };
    if text == LEGACY_SENTINEL {
        SENTINEL.to_string()
    } else {
        text
    }
}

pub fn task_fields(map: &Map<String, Value>) -> TaskFields {
    TaskFields {
        task_title: field(map, "task_title"),
        description: field(map, "description"),
        priority: field(map, "priority"),
        time_required: field(map, "time_required"),
        schedule_date: field(map, "schedule_date"),
        schedule_from: field(map, "schedule_from"),
        schedule_to: field(map, "schedule_to"),
        tag: field(map, "tag"),
    }
}

/// Copy every extracted field other than the sentinel onto `base`.
/// The title is never replaced.
pub fn overlay(base: &TaskFields, updates: &Map<String, Value>) -> TaskFields {
    let mut out = base.clone();
    let slots: [(&str, &mut String); 7] = [
        ("description", &mut out.description),
        ("schedule_date", &mut out.schedule_date),
        ("schedule_from", &mut out.schedule_from),
        ("schedule_to", &mut out.schedule_to),
        ("tag", &mut out.tag),
        ("priority", &mut out.priority),
        ("time_required", &mut out.time_required),
    ];
    for (key, slot) in slots {
        let value = field(updates, key);
        if value != SENTINEL {
            *slot = value;
        }
    }
    out
}

/// Model text with whitespace and wrapping quotes or backticks removed.
pub fn strip_quotes(text: &str) -> String {
    text.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim_matches('`')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_pattern_compiles_and_is_non_greedy() {
        let text = "```json\n{\"a\": 1}```\n```json\n{\"b\": 2}```";
        let caps: Vec<&str> = JSON_BLOCK
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        assert_eq!(caps, ["{\"a\": 1}", "{\"b\": 2}"]);
    }

    #[test]
    fn takes_the_first_fenced_block() {
        let text = "Sure!\n```json\n{\"task_title\": \"Gym\"}\n```\nand\n```json\n{\"task_title\": \"Other\"}\n```";
        let map = json_block(text);
        assert_eq!(map["task_title"], "Gym");
    }

    #[test]
    fn missing_or_broken_blocks_give_an_empty_map() {
        assert!(json_block("no code here").is_empty());
        assert!(json_block("```json\n{not json}\n```").is_empty());
        assert!(json_block("```json\n[1, 2]\n```").is_empty());
        assert!(json_block("```\n{\"a\": 1}\n```").is_empty());
    }

    #[test]
    fn sentinels_are_unified() {
        let map = json!({
            "task_title": "Read",
            "time_required": 1.5,
            "schedule_date": "-1",
            "schedule_from": null,
            "schedule_to": -1,
            "tag": " study "
        });
        let fields = task_fields(map.as_object().unwrap());
        assert_eq!(fields.task_title, "Read");
        assert_eq!(fields.time_required, "1.5");
        assert_eq!(fields.schedule_date, "F");
        assert_eq!(fields.schedule_from, "F");
        assert_eq!(fields.schedule_to, "F");
        assert_eq!(fields.tag, "study");
        assert_eq!(fields.priority, "F");
    }

    #[test]
    fn overlay_skips_sentinels_and_keeps_the_title() {
        let base = TaskFields {
            task_title: "Gym".into(),
            description: "legs".into(),
            priority: "Low".into(),
            schedule_from: "08:00".into(),
            ..Default::default()
        };
        let updates = json!({
            "task_title": "Swim",
            "description": "F",
            "priority": "High",
            "schedule_from": "-1",
            "schedule_to": "10:00"
        });
        let out = overlay(&base, updates.as_object().unwrap());
        assert_eq!(out.task_title, "Gym");
        assert_eq!(out.description, "legs");
        assert_eq!(out.priority, "High");
        assert_eq!(out.schedule_from, "08:00");
        assert_eq!(out.schedule_to, "10:00");
    }

    #[test]
    fn quotes_and_backticks_are_stripped() {
        assert_eq!(strip_quotes("  \"Called mom.\"\n"), "Called mom.");
        assert_eq!(strip_quotes("'done'"), "done");
        assert_eq!(strip_quotes("`ok`"), "ok");
    }
}
