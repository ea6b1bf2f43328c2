//! Path codec: nested records ⇄ flat dot-path maps.
//!
//! Only mappings are descended into. Arrays and scalars are leaves and are
//! stored as-is, whatever their content.

use serde_json::{Map, Value};

/// Flat mapping from dot-path to leaf value, in first-encounter order.
pub type FlatMap = Map<String, Value>;

/// Flattens a nested record into a dot-path map.
///
/// A non-mapping root has no fields and yields an empty map. Empty nested
/// mappings contribute no paths.
pub fn flatten(record: &Value) -> FlatMap {
    let mut flat = FlatMap::new();
    if let Some(obj) = record.as_object() {
        flatten_into(obj, "", &mut flat);
    }
    flat
}

fn flatten_into(obj: &Map<String, Value>, prefix: &str, flat: &mut FlatMap) {
    for (key, child) in obj {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match child {
            Value::Object(nested) => flatten_into(nested, &path, flat),
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
}

/// Rebuilds a nested record from a dot-path map.
///
/// Intermediate levels are created on demand. A non-mapping value sitting on
/// an intermediate segment is replaced by a fresh mapping. When a mapping is
/// assigned onto a path that already holds a mapping, the two are merged so
/// that results for `a` and `a.b` survive in either insertion order.
pub fn unflatten(flat: &FlatMap) -> Value {
    let mut root = Map::new();
    for (path, value) in flat {
        insert_path(&mut root, path, value.clone());
    }
    Value::Object(root)
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            assign(current, segment, value);
            return;
        }

        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Some(next) = slot.as_object_mut() else {
            return;
        };
        current = next;
    }
}

fn assign(target: &mut Map<String, Value>, segment: &str, value: Value) {
    match value {
        Value::Object(incoming) if target.get(segment).is_some_and(Value::is_object) => {
            if let Some(Value::Object(existing)) = target.get_mut(segment) {
                existing.extend(incoming);
            }
        }
        value => {
            target.insert(segment.to_string(), value);
        }
    }
}
