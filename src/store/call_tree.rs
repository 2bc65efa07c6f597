// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{CallId, CallRecord};
use crate::ops::{apply_ops, ops_from_record, ApplyResult, PatchMode};

/// Id-to-record map for one trace, rooted at the trace's sentinel id.
///
/// The root record exists from construction so that top-level calls always have a parent to
/// link under. Records are kept in first-seen order, which is also the order `--dump` prints.
#[derive(Debug, Clone)]
pub struct CallTree {
    root: CallId,
    records: HashMap<CallId, CallRecord>,
    order: Vec<CallId>,
    rev: u64,
}

impl CallTree {
    pub fn new(root: CallId) -> Self {
        let mut records = HashMap::new();
        records.insert(root.clone(), CallRecord::default());
        Self { order: vec![root.clone()], root, records, rev: 0 }
    }

    pub fn root(&self) -> &CallId {
        &self.root
    }

    /// Bumped once per non-empty application.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The root record always exists, so a tree is empty when nothing else has arrived.
    pub fn is_empty(&self) -> bool {
        self.records.len() <= 1
    }

    pub fn contains(&self, id: &CallId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &CallId) -> Option<&CallRecord> {
        self.records.get(id)
    }

    /// Child ids in first-linked order; empty for unknown ids.
    pub fn children_of(&self, id: &CallId) -> &[CallId] {
        self.records.get(id).map(CallRecord::children).unwrap_or_default()
    }

    pub fn parent_of(&self, id: &CallId) -> Option<&CallId> {
        self.records.get(id).and_then(CallRecord::parent)
    }

    /// Ancestors of `id`, nearest first. Stops at the first missing record or repeated id.
    pub fn ancestry(&self, id: &CallId) -> Vec<CallId> {
        let mut seen = HashSet::from([id.clone()]);
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(parent.clone()) {
                debug!(%id, %parent, "parent chain loops");
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// First call listed under the root, if any.
    pub fn first_top_level(&self) -> Option<&CallId> {
        self.children_of(&self.root).first()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CallId, &CallRecord)> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id).map(|record| (id, record)))
    }

    /// Folds decoded log lines into the tree as one update: the revision moves at most once.
    pub fn apply_records<I>(&mut self, lines: I, mode: PatchMode) -> ApplyResult
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let ops = lines.into_iter().flat_map(ops_from_record).collect();
        apply_ops(self, ops, mode)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub(crate) fn entry(&mut self, id: CallId) -> (&mut CallRecord, bool) {
        match self.records.entry(id) {
            Entry::Occupied(slot) => (slot.into_mut(), false),
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                (slot.insert(CallRecord::default()), true)
            }
        }
    }

    pub(crate) fn bump_rev(&mut self) -> u64 {
        self.rev += 1;
        self.rev
    }
}

impl Serialize for CallTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (id, record) in self.iter() {
            map.serialize_entry(id.as_str(), record)?;
        }
        map.end()
    }
}
