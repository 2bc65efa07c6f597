// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tracetail and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

// Record-level merge helpers used by `apply_ops`.

/// Largest jump past the end of an array that an index write may pad with nulls. Larger
/// indices are treated as object keys.
const MAX_INDEX_GAP: usize = 4096;

fn apply_op(record: &mut CallRecord, op: Op) {
    match op {
        Op::PutRecord { id, fields } => put_record(&id, record, fields),
        Op::LinkChild { child, .. } => {
            record.children.push(child);
        }
        Op::SetField { id, field, value } => {
            record.defined = true;
            set_field(&id, record, field, value);
        }
        Op::SetPayload { id, slot, at, value } => {
            record.defined = true;
            set_payload(&id, record, slot, &at, value);
        }
    }
}

fn put_record(id: &CallId, record: &mut CallRecord, fields: Map<String, Value>) {
    let children = std::mem::take(&mut record.children);
    let records = std::mem::take(&mut record.records);
    let previous_result = record.result.take();
    *record = CallRecord { children, records, defined: true, ..CallRecord::default() };

    for (key, value) in fields {
        match key.as_str() {
            "children" => match value {
                Value::Object(children) => {
                    for child in children.keys() {
                        match CallId::new(child) {
                            Ok(child) => {
                                record.children.push(child);
                            }
                            Err(err) => warn!(%id, child = %child, error = %err, "skipping child"),
                        }
                    }
                }
                other => debug!(%id, value = %other, "ignoring non-object children"),
            },
            "records" => match value {
                Value::Object(records) => {
                    for (record_id, value) in records {
                        match RecordId::new(&record_id) {
                            Ok(record_id) => *record.record_mut(record_id) = value,
                            Err(err) => {
                                warn!(%id, record = %record_id, error = %err, "skipping record")
                            }
                        }
                    }
                }
                other => debug!(%id, value = %other, "ignoring non-object records"),
            },
            "args" => record.args = value,
            "result" => {
                if previous_result.is_some() {
                    debug!(%id, "result overwritten by whole-record write");
                }
                record.result = Some(value);
            }
            other => match Field::from_key(other) {
                Some(field) => set_field(id, record, field, value),
                None => {
                    record.extra.insert(key, value);
                }
            },
        }
    }

    if record.result.is_none() {
        record.result = previous_result;
    }
}

fn set_field(id: &CallId, record: &mut CallRecord, field: Field, value: Value) {
    match field {
        Field::Parent => match value {
            Value::Null => record.parent = None,
            Value::String(raw) => match CallId::new(&raw) {
                Ok(parent) => record.parent = Some(parent),
                Err(err) => warn!(%id, parent = %raw, error = %err, "ignoring invalid parent id"),
            },
            other => warn!(%id, value = %other, "ignoring non-string parent"),
        },
        Field::Start | Field::End => {
            let slot = if field == Field::Start { &mut record.start } else { &mut record.end };
            match value {
                Value::Null => *slot = None,
                other => match other.as_f64() {
                    Some(time) => *slot = Some(time),
                    None => warn!(%id, value = %other, ?field, "ignoring non-numeric timestamp"),
                },
            }
        }
        Field::Name => record.name = text_of(value),
        Field::Doc => record.doc = text_of(value),
        Field::Source => {
            record.source = match value {
                Value::Null => None,
                other => Some(text_of(other)),
            }
        }
    }
}

fn text_of(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn set_payload(
    id: &CallId,
    record: &mut CallRecord,
    slot: PayloadSlot,
    at: &[Segment],
    value: Value,
) {
    match slot {
        PayloadSlot::Args => write_at(&mut record.args, at, value),
        PayloadSlot::Result => {
            if at.is_empty() {
                if record.result.is_some() {
                    debug!(%id, "result overwritten");
                }
                record.result = Some(value);
            } else {
                write_at(record.result.get_or_insert(Value::Null), at, value);
            }
        }
        PayloadSlot::Record(record_id) => write_at(record.record_mut(record_id), at, value),
        PayloadSlot::Extra(key) => {
            let slot = record.extra.entry(key.as_str()).or_insert(Value::Null);
            write_at(slot, at, value);
        }
    }
}

/// Writes `value` at `at` below `target`, creating intermediate containers as needed.
///
/// Mirrors the producer's `set` semantics: a missing or primitive intermediate becomes an
/// array when the next key is an index and an object otherwise.
fn write_at(target: &mut Value, at: &[Segment], value: Value) {
    let Some((key, rest)) = at.split_first() else {
        *target = value;
        return;
    };
    write_at(child_slot(target, key), rest, value);
}

fn child_slot<'a>(container: &'a mut Value, key: &Segment) -> &'a mut Value {
    let index = key.as_index().filter(|&index| match &*container {
        Value::Array(items) => index <= items.len() + MAX_INDEX_GAP,
        _ => index <= MAX_INDEX_GAP,
    });

    match container {
        Value::Object(_) => {}
        Value::Array(_) if index.is_some() => {}
        Value::Array(items) => {
            let map = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(position, item)| (position.to_string(), item))
                .collect();
            *container = Value::Object(map);
        }
        _ if index.is_some() => *container = Value::Array(Vec::new()),
        _ => *container = Value::Object(Map::new()),
    }

    match container {
        Value::Array(items) => {
            let index = index.unwrap_or(items.len());
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(key.as_str()).or_insert(Value::Null),
        other => other,
    }
}
