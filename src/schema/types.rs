//! Record type definitions
//!
//! Field kinds:
//! - string, email: UTF-8 strings (email adds a syntax check)
//! - enum, enum_list: a string, or list of strings, from a fixed set
//! - string_list: list of free strings
//! - date, date_list: `YYYY-MM-DD`, stored as typed dates
//! - int, float: numbers with optional inclusive bounds
//! - bool

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};

/// Field names the store writes itself, or that sanitized output uses.
pub const RESERVED_FIELDS: &[&str] = &[ID_FIELD, "id", CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Constraint carried by a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Email,
    Enum {
        values: Vec<String>,
    },
    EnumList {
        values: Vec<String>,
    },
    StringList,
    Date,
    DateList,
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Bool,
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Email => "email",
            FieldKind::Enum { .. } => "enum",
            FieldKind::EnumList { .. } => "enum_list",
            FieldKind::StringList => "string_list",
            FieldKind::Date => "date",
            FieldKind::DateList => "date_list",
            FieldKind::Int { .. } => "int",
            FieldKind::Float { .. } => "float",
            FieldKind::Bool => "bool",
        }
    }

    pub fn enum_of(values: &[&str]) -> Self {
        FieldKind::Enum {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn enum_list_of(values: &[&str]) -> Self {
        FieldKind::EnumList {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    /// Stored when the field is absent. Never set on required fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: None,
        }
    }

    /// Optional field that falls back to `default` when absent.
    pub fn defaulted(name: impl Into<String>, kind: FieldKind, default: Value) -> Self {
        Self {
            default: Some(default),
            ..Self::optional(name, kind)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required_string(name: impl Into<String>) -> Self {
        Self::required(name, FieldKind::String)
    }

    pub fn optional_string(name: impl Into<String>) -> Self {
        Self::optional(name, FieldKind::String)
    }

    pub fn required_int_range(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::required(
            name,
            FieldKind::Int {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    pub fn optional_float_range(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self::optional(
            name,
            FieldKind::Float {
                min: Some(min),
                max: Some(max),
            },
        )
    }
}

/// A named record type: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Collection this type is stored in: the lower-cased type name.
    pub fn collection_name(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks the definition itself (not a record).
    pub fn validate_structure(&self) -> Result<(), String> {
        let mut chars = self.name.chars();
        let starts_alpha = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
        if !starts_alpha || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "type name '{}' must start with a letter and contain only letters, digits or '_'",
                self.name
            ));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(format!("field #{} has an empty name", i));
            }
            if RESERVED_FIELDS.contains(&field.name.as_str()) {
                return Err(format!("field '{}' is reserved by the store", field.name));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(format!("field '{}' is declared twice", field.name));
            }
            if field.required && field.default.is_some() {
                return Err(format!("required field '{}' cannot have a default", field.name));
            }

            match &field.kind {
                FieldKind::Enum { values } | FieldKind::EnumList { values } if values.is_empty() => {
                    return Err(format!("field '{}' has an empty enumeration", field.name));
                }
                FieldKind::Int {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    return Err(format!("field '{}' has min {} > max {}", field.name, min, max));
                }
                FieldKind::Float {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    return Err(format!("field '{}' has min {} > max {}", field.name, min, max));
                }
                _ => {}
            }

            if let Some(default) = &field.default {
                let mut violations = Vec::new();
                super::validator::check_value(&field.kind, default, &field.name, &mut violations);
                if let Some(v) = violations.first() {
                    return Err(format!("default for '{}' is invalid: {}", field.name, v));
                }
            }
        }

        Ok(())
    }
}
