// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::ids::{CallId, RecordId};

/// One node of the call tree.
///
/// Records are assembled incrementally: a record may exist with only `children` populated
/// (an ancestor created ahead of its own definition), and `result`/`end` stay absent while
/// the call is in flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) parent: Option<CallId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end: Option<f64>,
    pub(crate) name: String,
    pub(crate) doc: String,
    pub(crate) args: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) source: Option<String>,
    pub(crate) children: ChildList,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_records")]
    pub(crate) records: Vec<(RecordId, Value)>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
    /// True once the record has been written as a whole (`"<id>": {...}`) or had any of its
    /// own fields set, as opposed to existing only because a descendant referenced it.
    #[serde(skip)]
    pub(crate) defined: bool,
}

impl CallRecord {
    pub fn parent(&self) -> Option<&CallId> {
        self.parent.as_ref()
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn children(&self) -> &[CallId] {
        self.children.as_slice()
    }

    pub fn records(&self) -> impl Iterator<Item = (&RecordId, &Value)> + '_ {
        self.records.iter().map(|(id, value)| (id, value))
    }

    pub fn record(&self, record_id: &str) -> Option<&Value> {
        self.records.iter().find(|(id, _)| id.as_str() == record_id).map(|(_, value)| value)
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub(crate) fn record_mut(&mut self, record_id: RecordId) -> &mut Value {
        let index = match self.records.iter().position(|(id, _)| *id == record_id) {
            Some(index) => index,
            None => {
                self.records.push((record_id, Value::Null));
                self.records.len() - 1
            }
        };
        &mut self.records[index].1
    }
}

fn serialize_records<S: Serializer>(
    records: &[(RecordId, Value)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(records.len()))?;
    for (id, value) in records {
        map.serialize_entry(id.as_str(), value)?;
    }
    map.end()
}

/// Child ids in first-inserted order.
///
/// Entries are only ever appended; re-linking an existing child keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChildList {
    order: Vec<CallId>,
    #[serde(skip)]
    members: HashSet<CallId>,
}

impl ChildList {
    /// Returns `true` when the child was not linked before.
    pub fn push(&mut self, child: CallId) -> bool {
        if !self.members.insert(child.clone()) {
            return false;
        }
        self.order.push(child);
        true
    }

    pub fn contains(&self, child: &CallId) -> bool {
        self.members.contains(child)
    }

    pub fn as_slice(&self) -> &[CallId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn first(&self) -> Option<&CallId> {
        self.order.first()
    }

    pub fn last(&self) -> Option<&CallId> {
        self.order.last()
    }

    pub fn position(&self, child: &CallId) -> Option<usize> {
        if !self.contains(child) {
            return None;
        }
        self.order.iter().position(|id| id == child)
    }

    pub fn get(&self, index: usize) -> Option<&CallId> {
        self.order.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::ChildList;
    use crate::model::CallId;

    #[test]
    fn child_list_keeps_first_insertion_order() {
        let mut children = ChildList::default();
        let a = CallId::new("a").unwrap();
        let b = CallId::new("b").unwrap();

        assert!(children.push(b.clone()));
        assert!(children.push(a.clone()));
        assert!(!children.push(b.clone()));

        assert_eq!(children.as_slice(), &[b.clone(), a.clone()]);
        assert_eq!(children.position(&a), Some(1));
        assert_eq!(children.position(&CallId::new("c").unwrap()), None);
    }
}
