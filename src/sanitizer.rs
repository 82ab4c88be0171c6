//! Stored document to transport record conversion
//!
//! - `_id` becomes a string `id`
//! - dates and date-times become ISO-8601 strings, identifiers become strings,
//!   at any depth
//! - everything else passes through
//!
//! Sanitizing a sanitized document changes nothing.

use serde_json::Value;

use crate::storage::{Document, StoredValue, ID_FIELD};

/// Field carrying the identifier in transport records.
pub const TRANSPORT_ID_FIELD: &str = "id";

/// Converts a stored document into its transport form.
pub fn sanitize(document: &Document) -> Document {
    let mut out: Document = document
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key.clone(), sanitize_value(value)))
        .collect();

    if let Some(raw_id) = document.get(ID_FIELD) {
        out.insert(TRANSPORT_ID_FIELD.to_string(), StoredValue::String(id_string(raw_id)));
    }
    out
}

/// Converts one value; only native-only kinds change.
pub fn sanitize_value(value: &StoredValue) -> StoredValue {
    match value {
        StoredValue::Date(_) | StoredValue::DateTime(_) | StoredValue::Id(_) => {
            StoredValue::String(value.canonical_string().unwrap_or_default())
        }
        StoredValue::List(items) => StoredValue::List(items.iter().map(sanitize_value).collect()),
        StoredValue::Map(map) => StoredValue::Map(
            map.iter()
                .map(|(key, v)| (key.clone(), sanitize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Sanitizes and renders a document as a JSON object.
pub fn to_transport_json(document: &Document) -> Value {
    Value::Object(
        sanitize(document)
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

fn id_string(raw: &StoredValue) -> String {
    match raw {
        StoredValue::String(s) => s.clone(),
        other => match sanitize_value(other) {
            StoredValue::String(s) => s,
            plain => plain.to_json().to_string(),
        },
    }
}
