// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed patch operations for the call tree.
//!
//! Each wire entry (`path -> value`) is translated into one or more [`Op`]s, which are then
//! merged into the tree by [`apply_ops`]. Application never removes anything: records,
//! children and auxiliary records only accumulate, and the resulting [`Delta`] reports which
//! call ids were created or touched.

use std::collections::HashSet;

use serde_json::{Map, Value};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{CallId, CallRecord, IdError, PatchPath, RecordId, Segment};
use crate::store::CallTree;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `"<id>": {...}`: replaces scalar and payload fields, merges children and records.
    PutRecord { id: CallId, fields: Map<String, Value> },
    /// `"<id>.children.<child>"`: appends `child` unless it is already linked.
    LinkChild { parent: CallId, child: CallId },
    /// `"<id>.<field>"` for the scalar fields of a record.
    SetField { id: CallId, field: Field, value: Value },
    /// Writes `value` at `at` inside one of the JSON payloads of a record.
    SetPayload { id: CallId, slot: PayloadSlot, at: Vec<Segment>, value: Value },
}

impl Op {
    pub fn target(&self) -> &CallId {
        match self {
            Self::PutRecord { id, .. }
            | Self::SetField { id, .. }
            | Self::SetPayload { id, .. } => id,
            Self::LinkChild { parent, .. } => parent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Parent,
    Start,
    End,
    Name,
    Doc,
    Source,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "parent" => Some(Self::Parent),
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "name" => Some(Self::Name),
            "doc" => Some(Self::Doc),
            "source" => Some(Self::Source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSlot {
    Args,
    Result,
    Record(RecordId),
    Extra(SmolStr),
}

/// How to treat writes whose target record has never been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchMode {
    /// Create the missing record and carry on. Producers may reference an ancestor before its
    /// own definition line arrives, and the viewer keeps whatever structure it is told about.
    #[default]
    Tolerant,
    /// Drop the write and report it in [`ApplyResult::rejected`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("invalid id in patch path '{path}': {source}")]
    InvalidId { path: String, source: IdError },
    #[error("field '{field}' of '{path}' is not a container")]
    NotAContainer { path: String, field: SmolStr },
    #[error("whole-record write for '{id}' is not an object")]
    RecordNotObject { id: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub rejected: Vec<Op>,
    pub delta: Delta,
}

/// Call ids created or modified by one application, each listed once in first-touch order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<CallId>,
    pub updated: Vec<CallId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: Vec<CallId>,
    updated: Vec<CallId>,
    seen: HashSet<CallId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, id: &CallId) {
        if self.seen.insert(id.clone()) {
            self.added.push(id.clone());
        }
    }

    fn record_updated(&mut self, id: &CallId) {
        if self.seen.insert(id.clone()) {
            self.updated.push(id.clone());
        }
    }

    fn finish(self) -> Delta {
        Delta { added: self.added, updated: self.updated }
    }
}

/// Translates one wire entry into ops, appending them to `out`.
pub fn ops_from_entry(path: &PatchPath, value: Value, out: &mut Vec<Op>) -> Result<(), OpError> {
    let segments = path.segments();
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    let id = call_id(path, head)?;

    let Some((slot, deeper)) = rest.split_first() else {
        let Value::Object(fields) = value else {
            return Err(OpError::RecordNotObject { id: id.into_string() });
        };
        out.push(Op::PutRecord { id, fields });
        return Ok(());
    };

    match slot.as_str() {
        "children" => match deeper.split_first() {
            Some((child, ignored)) => {
                if !ignored.is_empty() {
                    debug!(path = %path, "ignoring payload below a children entry");
                }
                out.push(Op::LinkChild { parent: id, child: call_id(path, child)? });
            }
            None => {
                let Value::Object(children) = value else {
                    return Err(OpError::NotAContainer {
                        path: path.to_string(),
                        field: SmolStr::new("children"),
                    });
                };
                for child in children.keys() {
                    out.push(Op::LinkChild {
                        parent: id.clone(),
                        child: CallId::new(child).map_err(|source| OpError::InvalidId {
                            path: path.to_string(),
                            source,
                        })?,
                    });
                }
            }
        },
        "records" => match deeper.split_first() {
            Some((record, at)) => {
                let record = RecordId::new(record.as_str())
                    .map_err(|source| OpError::InvalidId { path: path.to_string(), source })?;
                out.push(Op::SetPayload {
                    id,
                    slot: PayloadSlot::Record(record),
                    at: at.to_vec(),
                    value,
                });
            }
            None => {
                let Value::Object(records) = value else {
                    return Err(OpError::NotAContainer {
                        path: path.to_string(),
                        field: SmolStr::new("records"),
                    });
                };
                for (record, value) in records {
                    let record = RecordId::new(&record)
                        .map_err(|source| OpError::InvalidId { path: path.to_string(), source })?;
                    out.push(Op::SetPayload {
                        id: id.clone(),
                        slot: PayloadSlot::Record(record),
                        at: Vec::new(),
                        value,
                    });
                }
            }
        },
        "args" => {
            out.push(Op::SetPayload { id, slot: PayloadSlot::Args, at: deeper.to_vec(), value })
        }
        "result" => {
            out.push(Op::SetPayload { id, slot: PayloadSlot::Result, at: deeper.to_vec(), value })
        }
        key => match Field::from_key(key) {
            Some(field) if deeper.is_empty() => out.push(Op::SetField { id, field, value }),
            Some(_) => {
                return Err(OpError::NotAContainer {
                    path: path.to_string(),
                    field: SmolStr::new(key),
                });
            }
            None => out.push(Op::SetPayload {
                id,
                slot: PayloadSlot::Extra(SmolStr::new(key)),
                at: deeper.to_vec(),
                value,
            }),
        },
    }

    Ok(())
}

fn call_id(path: &PatchPath, segment: &Segment) -> Result<CallId, OpError> {
    CallId::new(segment.as_str())
        .map_err(|source| OpError::InvalidId { path: path.to_string(), source })
}

/// Translates one decoded log line (a `path -> value` mapping) into ops, in the line's key
/// order. Entries that cannot be translated are logged and skipped; the rest still apply.
pub fn ops_from_record(record: Map<String, Value>) -> Vec<Op> {
    let mut ops = Vec::with_capacity(record.len());
    for (raw_path, value) in record {
        let path = match PatchPath::parse(&raw_path) {
            Ok(path) => path,
            Err(err) => {
                warn!(path = %raw_path, error = %err, "skipping patch entry with malformed path");
                continue;
            }
        };
        if let Err(err) = ops_from_entry(&path, value, &mut ops) {
            warn!(error = %err, "skipping patch entry");
        }
    }
    ops
}

/// Applies `ops` in order. Later writes to the same location win.
pub fn apply_ops(tree: &mut CallTree, ops: Vec<Op>, mode: PatchMode) -> ApplyResult {
    let mut delta = DeltaBuilder::default();
    let mut rejected = Vec::new();
    let mut applied = 0usize;

    for op in ops {
        let target_known = tree.contains(op.target());
        let defines_target = matches!(op, Op::PutRecord { .. });

        if !target_known && !defines_target {
            match mode {
                PatchMode::Strict => {
                    debug!(id = %op.target(), "rejecting write to unknown record");
                    rejected.push(op);
                    continue;
                }
                PatchMode::Tolerant => {
                    debug!(id = %op.target(), "creating record ahead of its definition");
                }
            }
        }

        let target = op.target().clone();
        let (record, created) = tree.entry(target.clone());
        apply_op(record, op);
        if created {
            delta.record_added(&target);
        } else {
            delta.record_updated(&target);
        }
        applied += 1;
    }

    let new_rev = if applied > 0 { tree.bump_rev() } else { tree.rev() };
    ApplyResult { new_rev, applied, rejected, delta: delta.finish() }
}

// Extracted record-level merge implementation.
include!("ops_impl.rs");
