// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in trace used by `tracetail --demo`.
//!
//! The demo log is written into a [`MemoryLogSource`] a line at a time, so the viewer shows
//! calls appearing, spinners turning into results and auto-selection kicking in, without a
//! trace server.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::model::{TraceId, TraceIdError};
use crate::tail::MemoryLogSource;

pub const DEMO_TRACE_ID: &str = "01H8XGJWBWBAQ4Z4Y5V0F9S1QE";

pub fn demo_trace_id() -> Result<TraceId, TraceIdError> {
    TraceId::parse(DEMO_TRACE_ID)
}

const PAPER_QA_SOURCE: &str = r#"    async def run(self, question: str, paper: Paper) -> str:
        paragraphs = await self.select_paragraphs(question, paper)
        context = "\n\n".join(str(p) for p in paragraphs)
        return await self.answer(question, context)
"#;

struct DemoLog {
    trace: String,
    clock: f64,
    lines: Vec<String>,
}

impl DemoLog {
    fn new(trace: &str) -> Self {
        Self { trace: trace.to_owned(), clock: 1_700_000_000.0, lines: Vec::new() }
    }

    fn push(&mut self, entries: Map<String, Value>) {
        self.lines.push(format!("{}\n", Value::Object(entries)));
    }

    fn start(&mut self, parent: Option<&str>, id: &str, name: &str, doc: &str, args: Value) {
        let parent = parent.unwrap_or(&self.trace).to_owned();
        self.clock += 0.25;
        let mut entries = Map::new();
        entries.insert(format!("{parent}.children.{id}"), Value::Bool(true));
        entries.insert(
            id.to_owned(),
            json!({"parent": parent, "start": self.clock, "name": name, "doc": doc, "args": args}),
        );
        self.push(entries);
    }

    fn finish(&mut self, id: &str, result: Value) {
        self.clock += 0.5;
        let mut entries = Map::new();
        entries.insert(format!("{id}.result"), result);
        entries.insert(format!("{id}.end"), json!(self.clock));
        self.push(entries);
    }

    fn set(&mut self, path: String, value: Value) {
        let mut entries = Map::new();
        entries.insert(path, value);
        self.push(entries);
    }
}

/// Newline-terminated log lines of the demo trace, in write order.
pub fn demo_lines() -> Vec<String> {
    let question = "What was the primary outcome of the trial?";
    let paper = json!({"title": "Vitamin D and fracture risk", "year": 2021});
    let paragraphs = [
        "Participants were randomised to 2000 IU daily or placebo.",
        "The primary outcome was the incidence of total fractures.",
        "Secondary outcomes included falls and bone mineral density.",
    ];

    let mut log = DemoLog::new(DEMO_TRACE_ID);
    log.start(
        None,
        "qa",
        "run",
        "Answer a question about a paper.",
        json!({"self": {"class_name": "paper_qa"}, "question": question, "paper": paper.clone()}),
    );
    log.set("qa.source".to_owned(), json!(PAPER_QA_SOURCE));

    log.start(
        Some("qa"),
        "select",
        "select_paragraphs",
        "Rank paragraphs by relevance and keep the best ones.",
        json!({"self": {"class_name": "paper_qa"}, "question": question, "paper": paper}),
    );
    let mut scores = Vec::new();
    for (n, paragraph) in paragraphs.iter().enumerate() {
        let id = format!("rel{n}");
        log.start(
            Some("select"),
            &id,
            "relevance",
            "Score how relevant a paragraph is to the question.",
            json!({"question": question, "paragraph": paragraph}),
        );
        let prompt = format!("Q: {question}\nP: {paragraph}");
        log.set(format!("{id}.records.prompt"), json!({ "value": prompt }));
        let score = [0.21, 0.93, 0.34][n];
        log.finish(&id, json!(score));
        scores.push(score);
    }
    log.finish("select", json!([paragraphs[1]]));

    log.start(
        Some("qa"),
        "answer",
        "answer",
        "Answer the question from the selected context.",
        json!({"question": question, "context": paragraphs[1]}),
    );
    log.finish("answer", json!("The incidence of total fractures."));
    log.finish("qa", json!({"value": "The incidence of total fractures.", "scores": scores}));
    log.lines
}

/// Appends `lines` to `source`, one every `interval`. Each line is written in two halves so
/// the viewer also sees partial lines.
pub async fn feed(source: MemoryLogSource, lines: Vec<String>, interval: Duration) {
    for line in lines {
        let bytes = line.as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        source.append(head).await;
        tokio::time::sleep(interval / 2).await;
        source.append(tail).await;
        tokio::time::sleep(interval / 2).await;
    }
}
