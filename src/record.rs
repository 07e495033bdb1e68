//! Source records as published by a CKAN catalog.
//!
//! A [`SourceRecord`] is an order-preserving map of field name to JSON value.
//! Several CKAN fields (`author`, `date`, `publication`, `spatial`, ...) hold
//! JSON documents encoded as strings; [`parse_embedded`] decodes those and
//! degrades to an empty value instead of failing.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CrosswalkError, Result};

/// One dataset as returned by the catalog API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    fields: Map<String, Value>,
}

impl SourceRecord {
    /// Creates a record from an already decoded field map.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Creates a record from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::Config`] if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(CrosswalkError::Config(format!(
                "source record must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parses a record from CKAN `package_show` JSON.
    ///
    /// Accepts either the bare package object or the API envelope
    /// `{"success": true, "result": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or holds no package object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(mut fields) if fields.contains_key("success") => {
                let result = fields.remove("result").unwrap_or(Value::Null);
                Self::from_value(result)
            },
            other => Self::from_value(other),
        }
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// The URL-safe dataset name, or `""`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    /// The catalog-internal dataset id, or `""`.
    #[must_use]
    pub fn id(&self) -> &str {
        self.get("id").and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for SourceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Decodes a field that may hold JSON encoded as a string.
///
/// Strings are parsed as JSON; structured values pass through unchanged.
/// Blank strings, `null` and unparsable text all yield [`Value::Null`], so
/// callers treat them as an empty container. Plain scalars that are not JSON
/// (for example a bare title) also come back as [`Value::Null`]; use the raw
/// value when a scalar is expected.
#[must_use]
pub fn parse_embedded(value: &Value) -> Value {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Value::Null;
            }
            serde_json::from_str(text).unwrap_or_else(|err| {
                debug!(error = %err, "embedded JSON is malformed, treating as empty");
                Value::Null
            })
        },
        other => other.clone(),
    }
}

/// Decodes an embedded list. A single object becomes a one-element list.
#[must_use]
pub fn embedded_list(value: &Value) -> Vec<Map<String, Value>> {
    match parse_embedded(value) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

/// Decodes an embedded object; anything else yields an empty map.
#[must_use]
pub fn embedded_object(value: &Value) -> Map<String, Value> {
    match parse_embedded(value) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Renders a scalar JSON value as text. Containers and `null` yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
