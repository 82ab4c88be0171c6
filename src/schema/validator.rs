//! Record validation
//!
//! Validation semantics:
//! - Required fields must be present and non-null
//! - Optional fields may be absent or null; a declared default is then stored
//! - Present values must match their field kind exactly (no string-to-number coercion)
//! - Undeclared fields are dropped, or rejected when the policy says so
//! - Every violation is collected; one error reports all of them
//!
//! The validator is pure: it reads the registry and the input, nothing else.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::{FieldViolation, SchemaError, SchemaResult, ValidationError};
use super::registry::SchemaRegistry;
use super::types::{FieldDef, FieldKind};
use crate::storage::{Document, StoredValue};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// What to do with input fields the record type does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Accept the record and drop the field
    #[default]
    Ignore,
    /// Reject the record with one violation per undeclared field
    Reject,
}

/// A record that passed validation, ready for the storage handle.
///
/// Only the validator constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    type_name: String,
    collection: String,
    fields: Document,
}

impl ValidatedRecord {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn into_fields(self) -> Document {
        self.fields
    }
}

/// Validates raw JSON input against registered record types.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
    unknown_fields: UnknownFieldPolicy,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Validates `input` as a record of `type_name`.
    ///
    /// # Errors
    ///
    /// - `CARE_UNKNOWN_TYPE` if the type is not registered
    /// - `CARE_VALIDATION_FAILED` with every violation otherwise
    pub fn validate(&self, type_name: &str, input: &Value) -> SchemaResult<ValidatedRecord> {
        let record_type = self.registry.get(type_name)?;

        let Some(obj) = input.as_object() else {
            return Err(ValidationError::new(
                &record_type.name,
                vec![FieldViolation::type_mismatch("$root", "object", json_type_name(input))],
            )
            .into());
        };

        let mut violations = Vec::new();
        let fields = self.validate_object(obj, &record_type.fields, &mut violations);

        if !violations.is_empty() {
            return Err(SchemaError::Validation(ValidationError::new(
                &record_type.name,
                violations,
            )));
        }

        Ok(ValidatedRecord {
            type_name: record_type.name.clone(),
            collection: record_type.collection_name(),
            fields,
        })
    }

    fn validate_object(
        &self,
        obj: &Map<String, Value>,
        fields: &[FieldDef],
        violations: &mut Vec<FieldViolation>,
    ) -> Document {
        let mut document = Document::new();

        for field in fields {
            match obj.get(&field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    if let Some(stored) = check_value(&field.kind, value, &field.name, violations) {
                        document.insert(field.name.clone(), stored);
                    }
                }
                None if field.required => {
                    violations.push(FieldViolation::missing_field(&field.name));
                }
                None => {
                    if let Some(default) = &field.default {
                        if let Some(stored) =
                            check_value(&field.kind, default, &field.name, violations)
                        {
                            document.insert(field.name.clone(), stored);
                        }
                    }
                }
            }
        }

        if self.unknown_fields == UnknownFieldPolicy::Reject {
            for key in obj.keys() {
                if !fields.iter().any(|f| &f.name == key) {
                    violations.push(FieldViolation::unknown_field(key));
                }
            }
        }

        document
    }
}

/// Checks one value against a field kind, converting it to its stored form.
///
/// Pushes violations and returns `None` if the value does not conform.
pub(crate) fn check_value(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<StoredValue> {
    match kind {
        FieldKind::String => expect_str(value, path, violations).map(StoredValue::from),
        FieldKind::Email => {
            let s = expect_str(value, path, violations)?;
            if email_pattern().is_match(s) {
                Some(StoredValue::from(s))
            } else {
                violations.push(FieldViolation::invalid_email(path, s));
                None
            }
        }
        FieldKind::Enum { values } => check_member(values, value, path, violations),
        FieldKind::EnumList { values } => check_list(value, path, violations, |elem, elem_path, v| {
            check_member(values, elem, elem_path, v)
        }),
        FieldKind::StringList => check_list(value, path, violations, |elem, elem_path, v| {
            expect_str(elem, elem_path, v).map(StoredValue::from)
        }),
        FieldKind::Date => check_date(value, path, violations),
        FieldKind::DateList => check_list(value, path, violations, check_date),
        FieldKind::Int { min, max } => {
            let Some(n) = value.as_i64() else {
                violations.push(FieldViolation::type_mismatch(path, "int", json_type_name(value)));
                return None;
            };
            if min.map_or(false, |m| n < m) || max.map_or(false, |m| n > m) {
                violations.push(FieldViolation::out_of_range(path, describe_range(min, max), n));
                return None;
            }
            Some(StoredValue::Int(n))
        }
        FieldKind::Float { min, max } => {
            let Some(n) = value.as_f64() else {
                violations.push(FieldViolation::type_mismatch(path, "float", json_type_name(value)));
                return None;
            };
            if min.map_or(false, |m| n < m) || max.map_or(false, |m| n > m) {
                violations.push(FieldViolation::out_of_range(path, describe_range(min, max), n));
                return None;
            }
            Some(StoredValue::Float(n))
        }
        FieldKind::Bool => match value.as_bool() {
            Some(b) => Some(StoredValue::Bool(b)),
            None => {
                violations.push(FieldViolation::type_mismatch(path, "bool", json_type_name(value)));
                None
            }
        },
    }
}

/// Converts query-string text into the stored form of `field` for an equality filter.
///
/// Numbers and booleans are parsed from the text before the usual kind check. List
/// fields cannot be matched by a single query value.
pub fn parse_field_text(field: &FieldDef, raw: &str) -> Result<StoredValue, FieldViolation> {
    let value = match &field.kind {
        FieldKind::EnumList { .. } | FieldKind::StringList | FieldKind::DateList => {
            return Err(FieldViolation::type_mismatch(
                &field.name,
                "a single-valued field",
                field.kind.type_name(),
            ));
        }
        FieldKind::Int { .. } => raw.trim().parse::<i64>().map_or_else(|_| Value::from(raw), Value::from),
        FieldKind::Float { .. } => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::from(raw), Value::Number),
        FieldKind::Bool => match raw.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::from(raw),
        },
        _ => Value::from(raw),
    };

    let mut violations = Vec::new();
    match check_value(&field.kind, &value, &field.name, &mut violations) {
        Some(stored) => Ok(stored),
        None => Err(violations
            .into_iter()
            .next()
            .unwrap_or_else(|| FieldViolation::type_mismatch(&field.name, field.kind.type_name(), raw))),
    }
}

fn expect_str<'v>(value: &'v Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<&'v str> {
    let s = value.as_str();
    if s.is_none() {
        violations.push(FieldViolation::type_mismatch(path, "string", json_type_name(value)));
    }
    s
}

fn check_member(
    allowed: &[String],
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<StoredValue> {
    let s = expect_str(value, path, violations)?;
    if allowed.iter().any(|a| a == s) {
        Some(StoredValue::from(s))
    } else {
        violations.push(FieldViolation::not_in_set(path, allowed, s));
        None
    }
}

fn check_date(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<StoredValue> {
    let s = expect_str(value, path, violations)?;
    match NaiveDate::parse_from_str(s, DATE_FORMAT) {
        Ok(date) => Some(StoredValue::Date(date)),
        Err(_) => {
            violations.push(FieldViolation::invalid_date(path, s));
            None
        }
    }
}

/// Checks every element; the list is kept only if all elements conform.
fn check_list<F>(
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
    check_elem: F,
) -> Option<StoredValue>
where
    F: Fn(&Value, &str, &mut Vec<FieldViolation>) -> Option<StoredValue>,
{
    let Some(items) = value.as_array() else {
        violations.push(FieldViolation::type_mismatch(path, "list", json_type_name(value)));
        return None;
    };

    let before = violations.len();
    let mut stored = Vec::with_capacity(items.len());
    for (i, elem) in items.iter().enumerate() {
        let elem_path = format!("{}[{}]", path, i);
        if elem.is_null() {
            violations.push(FieldViolation::type_mismatch(&elem_path, "non-null value", "null"));
            continue;
        }
        if let Some(v) = check_elem(elem, &elem_path, violations) {
            stored.push(v);
        }
    }

    (violations.len() == before).then_some(StoredValue::List(stored))
}

fn describe_range<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
        (Some(lo), None) => format!("[{}, ..)", lo),
        (None, Some(hi)) => format!("(.., {}]", hi),
        (None, None) => "any range".to_string(),
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("email pattern is a valid regex")
    })
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
