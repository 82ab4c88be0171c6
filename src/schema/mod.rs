//! Record types and validation for carebase
//!
//! Record types are declared up front, either built in or loaded from JSON files,
//! and every inbound record is checked against its type before it reaches storage.
//!
//! # Design Principles
//!
//! - Collection name = lower-cased type name, unique per registry
//! - Declarative field kinds interpreted by one validation routine
//! - All violations reported together
//! - Unknown fields dropped unless strict mode is configured

pub mod builtin;
mod errors;
mod loader;
mod registry;
mod types;
mod validator;

pub use errors::{FieldViolation, SchemaError, SchemaResult, ValidationError};
pub use loader::SchemaLoader;
pub use registry::SchemaRegistry;
pub use types::{FieldDef, FieldKind, RecordType, RESERVED_FIELDS};
pub use validator::{parse_field_text, SchemaValidator, UnknownFieldPolicy, ValidatedRecord};
