//! Per-surface data model.
//!
//! A tree of JSON values whose root is always an object. Values are
//! addressed with the paths described in [`crate::path`]. Writes create
//! missing intermediate objects on the way down.
//!
//! ## Incoming value coercion
//!
//! Agents send data as lists of `{key, value*}` records:
//!
//! ```json
//! [{"key": "name", "valueString": "Ana"}, {"key": "age", "valueNumber": 31}]
//! ```
//!
//! Any list whose first element carries a `key` (and any empty list) is
//! folded into an object before it is stored. The first field whose name
//! starts with `value` supplies the value; a `valueMap` holding records is
//! folded recursively. A lone record keyed `.` sets the value at the target
//! path itself instead of nesting under a `.` key.
//!
//! String values that look like JSON objects or arrays are parsed when
//! `parse_json_strings` is on; strings that fail to parse are kept as-is.

use crate::path::{parse_index, segments};
use a2ui_protocol::json_kind;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Upper bound on how far past its end a list may be extended by one write
pub const MAX_LIST_GROWTH: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataModelError {
    #[error("Cannot replace the data model root with a {found} value")]
    NonMapRoot { found: &'static str },

    #[error("Cannot index the list at '{path}' with non-numeric segment '{segment}'")]
    NonNumericIndex { path: String, segment: String },

    #[error("Index {index} at '{path}' is too far past the end of a list of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

pub type DataModelResult<T> = Result<T, DataModelError>;

#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    root: Value,
    parse_json_strings: bool,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModel {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            parse_json_strings: true,
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            root: Value::Object(map),
            ..Self::new()
        }
    }

    pub fn with_json_string_parsing(mut self, enabled: bool) -> Self {
        self.parse_json_strings = enabled;
        self
    }

    pub fn parses_json_strings(&self) -> bool {
        self.parse_json_strings
    }

    /// The root object
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_object().map_or(true, Map::is_empty)
    }

    /// Look up `path`. `None` when any step is missing or not traversable.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in segments(path) {
            current = match current {
                Value::Object(map) => map.get(&segment)?,
                Value::Array(items) => items.get(parse_index(&segment)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Store `value` at `path`, coercing key/value record lists first.
    ///
    /// An empty path replaces the root, which must then be an object.
    pub fn set(&mut self, path: &str, value: Value) -> DataModelResult<()> {
        let coercer = Coercer {
            parse_json_strings: self.parse_json_strings,
        };
        coercer.set_in(&mut self.root, path, value)
    }

    pub fn clear(&mut self) {
        self.root = Value::Object(Map::new());
    }
}

#[derive(Clone, Copy)]
struct Coercer {
    parse_json_strings: bool,
}

impl Coercer {
    fn set_in(self, root: &mut Value, path: &str, value: Value) -> DataModelResult<()> {
        let value = self.coerce(value);
        let segments = segments(path);

        let Some((last, parents)) = segments.split_last() else {
            return match value {
                Value::Object(_) => {
                    *root = value;
                    Ok(())
                }
                other => Err(DataModelError::NonMapRoot {
                    found: json_kind(&other),
                }),
            };
        };

        let mut current = root;
        let mut walked = String::new();
        for segment in parents {
            current = child_container(current, segment, &walked)?;
            walked.push('/');
            walked.push_str(segment);
        }

        assign(current, last, value, &walked)
    }

    fn coerce(self, value: Value) -> Value {
        let items = match value {
            Value::Array(items) if is_record_list(&items) => items,
            other => return other,
        };

        if let [record] = items.as_slice() {
            if record.get("key").and_then(Value::as_str) == Some(".") {
                if let Some((field, inner)) = record.as_object().and_then(value_field) {
                    return self.coerce_field(field, inner.clone());
                }
            }
        }

        Value::Object(self.records_to_map(items))
    }

    fn coerce_field(self, field: &str, value: Value) -> Value {
        match value {
            Value::Array(items) if field == "valueMap" => Value::Object(self.records_to_map(items)),
            Value::String(text) if self.parse_json_strings => parse_if_json_string(text),
            other => other,
        }
    }

    fn records_to_map(self, records: Vec<Value>) -> Map<String, Value> {
        let mut target = Value::Object(Map::new());

        for record in records {
            let Value::Object(record) = record else {
                continue;
            };
            let key = match record.get("key") {
                Some(Value::String(key)) => key.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            let Some((field, inner)) = value_field(&record) else {
                continue;
            };

            let value = self.coerce_field(field, inner.clone());
            if let Err(err) = self.set_in(&mut target, &key, value) {
                warn!(key = %key, error = %err, "Skipping data record");
            }
        }

        match target {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

fn is_record_list(items: &[Value]) -> bool {
    match items.first() {
        None => true,
        Some(first) => first.as_object().is_some_and(|o| o.contains_key("key")),
    }
}

/// First `value*` field of a record, in field order
fn value_field(record: &Map<String, Value>) -> Option<(&str, &Value)> {
    record
        .iter()
        .find(|(name, _)| name.starts_with("value"))
        .map(|(name, value)| (name.as_str(), value))
}

fn parse_if_json_string(text: String) -> Value {
    let trimmed = text.trim();
    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !looks_like_json {
        return Value::String(text);
    }

    match serde_json::from_str(trimmed) {
        Ok(parsed) => parsed,
        Err(err) => {
            let preview: String = text.chars().take(50).collect();
            warn!(preview = %preview, error = %err, "Failed to parse potential JSON string");
            Value::String(text)
        }
    }
}

/// Step into `segment`, replacing anything that is not a container with an
/// empty object
fn child_container<'a>(
    current: &'a mut Value,
    segment: &str,
    walked: &str,
) -> DataModelResult<&'a mut Value> {
    let slot = match current {
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        Value::Array(items) => list_slot(items, segment, walked)?,
        other => {
            *other = Value::Object(Map::new());
            return child_container(other, segment, walked);
        }
    };

    if !slot.is_object() && !slot.is_array() {
        *slot = Value::Object(Map::new());
    }
    Ok(slot)
}

fn assign(current: &mut Value, segment: &str, value: Value, walked: &str) -> DataModelResult<()> {
    match current {
        Value::Array(items) => {
            *list_slot(items, segment, walked)? = value;
        }
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
        }
        other => {
            let mut map = Map::new();
            map.insert(segment.to_string(), value);
            *other = Value::Object(map);
        }
    }
    Ok(())
}

fn list_slot<'a>(
    items: &'a mut Vec<Value>,
    segment: &str,
    walked: &str,
) -> DataModelResult<&'a mut Value> {
    let path = if walked.is_empty() { "/" } else { walked };
    let index = parse_index(segment).ok_or_else(|| DataModelError::NonNumericIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })?;

    if index >= items.len() {
        if index - items.len() > MAX_LIST_GROWTH {
            return Err(DataModelError::IndexOutOfRange {
                path: path.to_string(),
                index,
                len: items.len(),
            });
        }
        items.resize(index + 1, Value::Null);
    }

    items
        .get_mut(index)
        .ok_or_else(|| DataModelError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: 0,
        })
}
