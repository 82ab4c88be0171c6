//! Schema error types
//!
//! Error codes:
//! - CARE_UNKNOWN_TYPE: lookup of an undeclared record type
//! - CARE_DUPLICATE_COLLECTION: two record types map to one collection
//! - CARE_INVALID_RECORD_TYPE: a record type definition is inconsistent
//! - CARE_MALFORMED_SCHEMA: a schema file could not be read or parsed
//! - CARE_VALIDATION_FAILED: a record violates its record type

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// One field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field path (e.g. "services[2]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// What was found instead
    pub actual: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "required field to be present", "missing")
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "undeclared field present")
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn not_in_set(field: impl Into<String>, allowed: &[String], actual: &str) -> Self {
        Self::new(
            field,
            format!("a member of the allowed set [{}]", allowed.join(", ")),
            format!("'{}'", actual),
        )
    }

    pub fn invalid_email(field: impl Into<String>, actual: &str) -> Self {
        Self::new(field, "a valid email syntax", format!("'{}'", actual))
    }

    pub fn invalid_date(field: impl Into<String>, actual: &str) -> Self {
        Self::new(field, "a date in YYYY-MM-DD form", format!("'{}'", actual))
    }

    pub fn out_of_range(field: impl Into<String>, range: impl Into<String>, actual: impl fmt::Display) -> Self {
        Self::new(field, format!("a value within {}", range.into()), actual.to_string())
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// A record rejected by validation, with every violation found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    type_name: String,
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(type_name: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            type_name: type_name.into(),
            violations,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// True if some violation concerns `field` or one of its elements.
    pub fn names_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| {
            v.field == field
                || v.field
                    .strip_prefix(field)
                    .map_or(false, |rest| rest.starts_with('[') || rest.starts_with('.'))
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed validation: ", self.type_name)?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Schema registry, loader and validation errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown record type '{0}'")]
    UnknownType(String),

    #[error("record type '{type_name}' maps to collection '{collection}', already used by '{existing}'")]
    DuplicateCollection {
        type_name: String,
        collection: String,
        existing: String,
    },

    #[error("invalid record type '{type_name}': {reason}")]
    InvalidRecordType { type_name: String, reason: String },

    #[error("malformed schema file '{path}': {reason}")]
    MalformedSchema { path: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SchemaError {
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        SchemaError::UnknownType(type_name.into())
    }

    pub fn invalid_record_type(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidRecordType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownType(_) => "CARE_UNKNOWN_TYPE",
            SchemaError::DuplicateCollection { .. } => "CARE_DUPLICATE_COLLECTION",
            SchemaError::InvalidRecordType { .. } => "CARE_INVALID_RECORD_TYPE",
            SchemaError::MalformedSchema { .. } => "CARE_MALFORMED_SCHEMA",
            SchemaError::Validation(_) => "CARE_VALIDATION_FAILED",
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            SchemaError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let violation = FieldViolation::type_mismatch("phone", "string", "int");
        let display = violation.to_string();
        assert!(display.contains("phone"));
        assert!(display.contains("string"));
        assert!(display.contains("int"));
    }

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = ValidationError::new(
            "CareRequest",
            vec![
                FieldViolation::missing_field("phone"),
                FieldViolation::invalid_email("email", "nope"),
            ],
        );
        let display = err.to_string();
        assert!(display.contains("phone"));
        assert!(display.contains("email"));
        assert!(display.starts_with("CareRequest failed validation"));
    }

    #[test]
    fn test_names_field_matches_elements() {
        let err = ValidationError::new(
            "CareRequest",
            vec![FieldViolation::new("services[1]", "x", "y")],
        );
        assert!(err.names_field("services"));
        assert!(!err.names_field("service"));
        assert!(!err.names_field("phone"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::unknown_type("X").code(), "CARE_UNKNOWN_TYPE");
        let validation: SchemaError = ValidationError::new("X", vec![]).into();
        assert_eq!(validation.code(), "CARE_VALIDATION_FAILED");
        assert!(validation.as_validation().is_some());
    }
}
