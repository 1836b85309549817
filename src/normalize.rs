//! Payload normalization
//!
//! The backend has shipped several payload shapes over time: a bare JSON array
//! of lines, the same array encoded as text, and a wrapper object with `lines`
//! and an optional precomputed `summary`. Absence has been encoded as null, as
//! an empty string and as the literal text `"false"`. Every shape normalizes to
//! a fully defaulted [`NormalizedModel`]; anything unrecognized degrades to the
//! empty model instead of failing.

use std::collections::HashSet;

use serde_json::Value;

use crate::model::{DeliveryLine, NormalizedModel};
use crate::summary::{aggregate, Summary};

/// Text the backend uses to mean "no value".
pub const FALSE_SENTINEL: &str = "false";

/// Normalize a raw payload. `None` stands for an absent value.
pub fn normalize<'a>(raw: impl Into<Option<&'a Value>>) -> NormalizedModel {
    let Some(raw) = raw.into() else {
        return NormalizedModel::empty();
    };

    if is_falsy(raw) {
        return NormalizedModel::empty();
    }

    match raw {
        Value::String(text) => normalize_text(text),
        other => normalize_decoded(other),
    }
}

/// Normalize a payload that arrived as text.
pub fn normalize_text(text: &str) -> NormalizedModel {
    if text.is_empty() || text == FALSE_SENTINEL {
        return NormalizedModel::empty();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(decoded) => normalize_decoded(&decoded),
        Err(e) => {
            tracing::debug!("payload text is not valid JSON, using empty model: {}", e);
            NormalizedModel::empty()
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == FALSE_SENTINEL,
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Shapes that are valid after decoding: a line array or a wrapper object.
fn normalize_decoded(value: &Value) -> NormalizedModel {
    match value {
        Value::Array(items) => {
            let lines = read_lines(items);
            let summary = aggregate(&lines);
            NormalizedModel { lines, summary }
        }
        Value::Object(object) if object.contains_key("lines") => {
            let lines = match object.get("lines") {
                Some(Value::Array(items)) => read_lines(items),
                _ => {
                    tracing::debug!("payload `lines` is not an array, treating as empty");
                    Vec::new()
                }
            };
            let summary = match object.get("summary") {
                Some(Value::Object(overrides)) => Summary::from_overrides(overrides),
                _ => aggregate(&lines),
            };
            NormalizedModel { lines, summary }
        }
        other => {
            tracing::debug!(
                "unrecognized payload shape ({}), using empty model",
                shape_name(other)
            );
            NormalizedModel::empty()
        }
    }
}

/// Read every element as a line, keeping only the first line for any repeated id.
fn read_lines(items: &[Value]) -> Vec<DeliveryLine> {
    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let line = DeliveryLine::from_value(item);
        if let Some(id) = line.id {
            if !seen.insert(id) {
                tracing::debug!("dropping repeated delivery line id {}", id);
                continue;
            }
        }
        lines.push(line);
    }

    lines
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
