// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use serde_json::{json, Map, Value};

use tracetail::model::TraceId;

pub const TRACE: &str = "01GQZ6C2XKJ1T8E9W3M4N5P6R7";

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// A few dozen calls, shallow.
    Small,
    /// A few thousand calls with results and prompt records.
    Medium,
    /// Deep recursion with long argument payloads.
    DeepLongArgs,
}

impl Case {
    fn shape(self) -> (usize, usize, usize) {
        // (calls, fan-out, argument text length)
        match self {
            Self::Small => (40, 4, 24),
            Self::Medium => (4_000, 8, 64),
            Self::DeepLongArgs => (1_000, 1, 2_048),
        }
    }
}

pub fn trace_id() -> TraceId {
    TraceId::parse(TRACE).expect("trace id")
}

fn ascii_repeat_to_len(prefix: &str, fill: char, target_len: usize) -> String {
    if prefix.len() >= target_len {
        return prefix[..target_len].to_owned();
    }

    let mut out = String::with_capacity(target_len);
    out.push_str(prefix);
    while out.len() < target_len {
        out.push(fill);
    }
    out
}

fn call_id(idx: usize) -> String {
    format!("c{idx:06}")
}

/// Patch lines the way a producer writes them: one line introducing each call, then one line
/// finishing it, with every fourth call also carrying a prompt record.
pub fn records(case: Case) -> Vec<Map<String, Value>> {
    let (calls, fan_out, arg_len) = case.shape();
    let mut lines = Vec::with_capacity(calls * 2);

    for idx in 0..calls {
        let id = call_id(idx);
        let parent = if idx == 0 { TRACE.to_owned() } else { call_id((idx - 1) / fan_out) };
        let question = ascii_repeat_to_len(&format!("question {idx} "), 'q', arg_len);
        let name = if idx % 5 == 0 { "relevance" } else { "step" };
        let started = idx as f64 * 0.01;

        let mut start = Map::new();
        start.insert(format!("{parent}.children.{id}"), Value::Bool(true));
        start.insert(
            id.clone(),
            json!({
                "parent": parent,
                "start": started,
                "name": name,
                "args": {"self": {"class_name": "bench"}, "question": question},
            }),
        );
        lines.push(start);

        let mut finish = Map::new();
        finish.insert(format!("{id}.result"), json!({"value": idx, "ok": true}));
        finish.insert(format!("{id}.end"), json!(started + 0.5));
        if idx % 4 == 0 {
            finish.insert(format!("{id}.records.prompt.value"), json!(question));
        }
        lines.push(finish);
    }
    lines
}

/// [`records`] serialized as a JSONL log.
pub fn log_bytes(case: Case) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records(case) {
        serde_json::to_writer(&mut out, &record).expect("serialize fixture line");
        out.push(b'\n');
    }
    out
}
