//! Stored value model
//!
//! A stored document is an ordered map from field name to [`StoredValue`]. Value kinds
//! form an explicit tagged union, so dates and store-generated identifiers come back
//! from the record file with their kind intact and the sanitizer can dispatch on the
//! tag instead of guessing at shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

/// Field under which the store keeps the generated identifier.
pub const ID_FIELD: &str = "_id";

/// Field stamped with the insert time.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Field stamped with the last write time.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A stored document: field name to value.
pub type Document = BTreeMap<String, StoredValue>;

/// Store-generated document identifier.
///
/// Only the storage layer creates these; callers never supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Id(DocumentId),
    List(Vec<StoredValue>),
    Map(Document),
}

impl StoredValue {
    /// True for values that have no JSON-native representation.
    pub fn is_native_only(&self) -> bool {
        matches!(
            self,
            StoredValue::Date(_) | StoredValue::DateTime(_) | StoredValue::Id(_)
        )
    }

    /// Converts plain JSON into stored values without any schema knowledge.
    ///
    /// Strings stay strings; typed dates are only produced by the validator.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => StoredValue::Null,
            Value::Bool(b) => StoredValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => StoredValue::Int(i),
                None => StoredValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => StoredValue::String(s.clone()),
            Value::Array(items) => StoredValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(obj) => StoredValue::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Renders the value as JSON, writing native-only kinds in their string form.
    pub fn to_json(&self) -> Value {
        match self {
            StoredValue::Null => Value::Null,
            StoredValue::Bool(b) => Value::Bool(*b),
            StoredValue::Int(i) => Value::Number((*i).into()),
            StoredValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            StoredValue::String(s) => Value::String(s.clone()),
            StoredValue::Date(_) | StoredValue::DateTime(_) | StoredValue::Id(_) => {
                Value::String(self.canonical_string().unwrap_or_default())
            }
            StoredValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            StoredValue::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// ISO-8601 / identifier string for native-only kinds, `None` otherwise.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            StoredValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            StoredValue::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            StoredValue::Id(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::String(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::String(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

impl From<bool> for StoredValue {
    fn from(value: bool) -> Self {
        StoredValue::Bool(value)
    }
}

impl From<NaiveDate> for StoredValue {
    fn from(value: NaiveDate) -> Self {
        StoredValue::Date(value)
    }
}

impl From<DateTime<Utc>> for StoredValue {
    fn from(value: DateTime<Utc>) -> Self {
        StoredValue::DateTime(value)
    }
}

impl From<DocumentId> for StoredValue {
    fn from(value: DocumentId) -> Self {
        StoredValue::Id(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_document_id_display_parses_back() {
        let id = DocumentId::generate();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.to_string().len(), 32);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }

    #[test]
    fn test_tagged_serialization_keeps_kind() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let value = StoredValue::List(vec![StoredValue::Date(date)]);

        let encoded = serde_json::to_string(&value).unwrap();
        let decoded: StoredValue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
        assert!(encoded.contains("\"kind\":\"date\""));
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(StoredValue::from_json(&json!(7)), StoredValue::Int(7));
        assert_eq!(StoredValue::from_json(&json!(4.5)), StoredValue::Float(4.5));
    }

    #[test]
    fn test_to_json_renders_native_kinds_as_strings() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap();
        assert_eq!(
            StoredValue::DateTime(dt).to_json(),
            json!("2026-01-05T09:30:00Z")
        );

        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(StoredValue::Date(date).to_json(), json!("2026-01-05"));
    }

    #[test]
    fn test_nan_float_renders_as_null() {
        assert_eq!(StoredValue::Float(f64::NAN).to_json(), Value::Null);
    }
}
