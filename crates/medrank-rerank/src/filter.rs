use std::collections::HashMap;

use medrank_core::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Accepted metadata value(s) for one filter key.
///
/// Deserializes from either a single JSON value or a JSON array. A list
/// means "any of"; a single value means "equal to".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// The metadata value must be one of these.
    AnyOf(Vec<Value>),
    /// The metadata value must equal this.
    Exact(Value),
}

impl FilterValue {
    /// Whether a document's metadata value satisfies this filter.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FilterValue::AnyOf(options) => options.iter().any(|o| values_equal(o, value)),
            FilterValue::Exact(expected) => values_equal(expected, value),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(options) => FilterValue::AnyOf(options),
            other => FilterValue::Exact(other),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Exact(Value::String(value.to_string()))
    }
}

/// JSON equality, except numbers compare by value so `1` matches `1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Whether `metadata` passes every filter.
///
/// A key missing from the metadata fails its filter. No filters means every
/// document passes.
pub fn matches_filters(
    metadata: &HashMap<String, Value>,
    filters: &HashMap<String, FilterValue>,
) -> bool {
    filters.iter().all(|(key, filter)| {
        metadata
            .get(key)
            .is_some_and(|value| filter.accepts(value))
    })
}

/// Keep only the documents passing `filters`, preserving order.
pub fn apply_filters(
    documents: Vec<Document>,
    filters: &HashMap<String, FilterValue>,
) -> Vec<Document> {
    if filters.is_empty() {
        return documents;
    }
    documents
        .into_iter()
        .filter(|doc| matches_filters(&doc.metadata, filters))
        .collect()
}
