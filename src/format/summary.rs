// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

use crate::model::CallRecord;

pub const SUMMARY_MAX_CHARS: usize = 35;

/// Calls that talk to a model get a chat marker in the tree.
pub const MODEL_CALL_NAMES: [&str; 5] =
    ["relevance", "answer", "predict", "classify", "prompted_classify"];

const GENERIC_CALL_NAMES: [&str; 2] = ["execute", "run"];

pub fn is_model_call(name: &str) -> bool {
    MODEL_CALL_NAMES.contains(&name)
}

/// Human-facing name of a call.
///
/// Generic entry points (`execute`, `run`) on a recipe object are shown under the recipe's
/// class name instead. Underscores become spaces and the first letter is capitalised.
pub fn display_name(record: &CallRecord) -> String {
    let class_name = record
        .args()
        .get("self")
        .and_then(|receiver| receiver.get("class_name"))
        .and_then(Value::as_str)
        .filter(|class_name| !class_name.is_empty());

    let name = match class_name {
        Some(class_name) if GENERIC_CALL_NAMES.contains(&record.name()) => class_name,
        _ => record.name(),
    };

    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn short_summary(value: Option<&Value>) -> String {
    short_summary_with(value, SUMMARY_MAX_CHARS)
}

/// One-line summary of a payload.
///
/// An object carrying `value` is summarised by that field. Otherwise its `self` and
/// `record` fields are dropped and the first remaining field is followed down to a scalar.
/// Missing and `null` payloads read as `()`.
pub fn short_summary_with(value: Option<&Value>, max_chars: usize) -> String {
    let leaf = match value {
        Some(Value::Object(map)) => match map.get("value") {
            Some(inner) => first_descendant(Some(inner)),
            None => first_descendant(
                map.iter()
                    .find(|(key, _)| !matches!(key.as_str(), "self" | "record"))
                    .map(|(_, v)| v),
            ),
        },
        other => first_descendant(other),
    };

    let text = match leaf {
        None | Some(Value::Null) => "()".to_owned(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        },
        Some(other) => other.to_string(),
    };

    if text.chars().count() <= max_chars {
        return text;
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

fn first_descendant(mut value: Option<&Value>) -> Option<&Value> {
    loop {
        value = match value {
            Some(Value::Object(map)) => map.values().next(),
            Some(Value::Array(items)) => items.first(),
            other => return other,
        };
    }
}

/// Removes the indentation shared by every non-blank line.
pub fn strip_indent(source: &str) -> String {
    let indent = source
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|ch| ch.is_whitespace()).count())
        .min()
        .unwrap_or(usize::MAX);

    source
        .split('\n')
        .map(|line| line.char_indices().nth(indent).map_or("", |(at, _)| &line[at..]))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::{display_name, is_model_call, short_summary, strip_indent};
    use crate::model::CallRecord;

    fn record(name: &str, args: Value) -> CallRecord {
        CallRecord { name: name.to_owned(), args, ..CallRecord::default() }
    }

    #[rstest]
    #[case("answer_question", json!({}), "Answer question")]
    #[case("run", json!({"self": {"class_name": "paper_qa"}}), "Paper qa")]
    #[case("execute", json!({"self": {"class_name": "Amplify"}}), "Amplify")]
    #[case("answer", json!({"self": {"class_name": "ignored"}}), "Answer")]
    #[case("run", json!({"self": {}}), "Run")]
    #[case("run", json!({"self": {"class_name": 3}}), "Run")]
    #[case("", json!({}), "")]
    fn display_name_prefers_recipe_class(
        #[case] name: &str,
        #[case] args: Value,
        #[case] expected: &str,
    ) {
        assert_eq!(display_name(&record(name, args)), expected);
    }

    #[rstest]
    #[case(json!({"question": "What is up?"}), "What is up?")]
    #[case(json!({"self": {"x": 1}, "question": "q"}), "q")]
    #[case(json!({"record": "r", "self": 1, "paper": {"title": "T"}}), "T")]
    #[case(json!({"value": {"deep": [7, 8]}, "other": 1}), "7")]
    #[case(json!({"value": null}), "()")]
    #[case(json!({}), "()")]
    #[case(json!([]), "()")]
    #[case(json!(null), "()")]
    #[case(json!(true), "true")]
    #[case(json!(2.0), "2")]
    #[case(json!(2.5), "2.5")]
    #[case(json!({"nested": {"self": "kept"}}), "kept")]
    fn short_summary_follows_first_fields(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(short_summary(Some(&value)), expected);
    }

    #[test]
    fn short_summary_of_missing_payload() {
        assert_eq!(short_summary(None), "()");
    }

    #[test]
    fn short_summary_truncates_long_text() {
        let long = json!("The quick brown fox jumps over the lazy dog");
        assert_eq!(short_summary(Some(&long)), "The quick brown fox jumps over the...");

        let padded = json!("abcdefghijklmnopqrstuvwxyz01234567 9999");
        assert_eq!(short_summary(Some(&padded)), "abcdefghijklmnopqrstuvwxyz01234567...");
    }

    #[test]
    fn strip_indent_removes_common_prefix() {
        let source = "    def f(x):\n\n        return x\n    ";
        assert_eq!(strip_indent(source), "def f(x):\n\n    return x\n");
    }

    #[test]
    fn strip_indent_keeps_unindented_source() {
        assert_eq!(strip_indent("a\n  b"), "a\n  b");
    }

    #[test]
    fn model_calls_are_recognised() {
        assert!(is_model_call("prompted_classify"));
        assert!(!is_model_call("run"));
    }
}
