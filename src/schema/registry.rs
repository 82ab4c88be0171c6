//! Schema registry
//!
//! Static table from record type to collection name, built once at startup.
//! Lookups are case-insensitive and the collection is always the lower-cased
//! type name, so two types can never share a collection.

use std::collections::BTreeMap;

use super::builtin;
use super::errors::{SchemaError, SchemaResult};
use super::types::RecordType;

#[derive(Debug, Clone)]
struct Entry {
    record_type: RecordType,
    collection: String,
}

/// Registered record types keyed by collection name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, Entry>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `CareRequest` and `Caregiver`.
    pub fn with_builtin_types() -> SchemaResult<Self> {
        let mut registry = Self::new();
        for record_type in builtin::builtin_types() {
            registry.register(record_type)?;
        }
        Ok(registry)
    }

    /// Registers a record type.
    ///
    /// # Errors
    ///
    /// - `CARE_INVALID_RECORD_TYPE` if the definition is inconsistent
    /// - `CARE_DUPLICATE_COLLECTION` if its collection name is already taken
    pub fn register(&mut self, record_type: RecordType) -> SchemaResult<()> {
        record_type
            .validate_structure()
            .map_err(|reason| SchemaError::invalid_record_type(&record_type.name, reason))?;

        let collection = record_type.collection_name();
        if let Some(existing) = self.entries.get(&collection) {
            return Err(SchemaError::DuplicateCollection {
                type_name: record_type.name,
                collection,
                existing: existing.record_type.name.clone(),
            });
        }

        self.entries.insert(
            collection.clone(),
            Entry {
                record_type,
                collection,
            },
        );
        Ok(())
    }

    fn entry(&self, type_name: &str) -> SchemaResult<&Entry> {
        self.entries
            .get(&type_name.to_lowercase())
            .ok_or_else(|| SchemaError::unknown_type(type_name))
    }

    /// Collection name for `type_name`.
    pub fn collection_name_for(&self, type_name: &str) -> SchemaResult<&str> {
        self.entry(type_name).map(|e| e.collection.as_str())
    }

    pub fn get(&self, type_name: &str) -> SchemaResult<&RecordType> {
        self.entry(type_name).map(|e| &e.record_type)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(&type_name.to_lowercase())
    }

    /// Declared type names, ordered by collection.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.record_type.name.as_str())
    }

    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldDef;

    #[test]
    fn test_builtin_collections() {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        assert_eq!(registry.collection_name_for("CareRequest").unwrap(), "carerequest");
        assert_eq!(registry.collection_name_for("Caregiver").unwrap(), "caregiver");
        assert_eq!(
            registry.collections().collect::<Vec<_>>(),
            vec!["caregiver", "carerequest"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        for name in ["CareRequest", "carerequest", "CAREREQUEST"] {
            assert_eq!(registry.collection_name_for(name).unwrap(), "carerequest");
        }
        assert_eq!(registry.get("carerequest").unwrap().name, "CareRequest");
    }

    #[test]
    fn test_collection_name_is_stable() {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        let first = registry.collection_name_for("Caregiver").unwrap().to_string();
        for _ in 0..10 {
            assert_eq!(registry.collection_name_for("Caregiver").unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_type() {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        let err = registry.collection_name_for("Booking").unwrap_err();
        assert_eq!(err.code(), "CARE_UNKNOWN_TYPE");
        assert!(err.to_string().contains("Booking"));
    }

    #[test]
    fn test_colliding_collection_rejected() {
        let mut registry = SchemaRegistry::with_builtin_types().unwrap();
        let clash = RecordType::new("CAREGIVER", vec![FieldDef::required_string("name")]);

        let err = registry.register(clash).unwrap_err();
        assert_eq!(err.code(), "CARE_DUPLICATE_COLLECTION");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_type_rejected() {
        let mut registry = SchemaRegistry::new();
        let bad = RecordType::new("Bad Name", vec![]);
        assert_eq!(registry.register(bad).unwrap_err().code(), "CARE_INVALID_RECORD_TYPE");
        assert!(registry.is_empty());
    }
}
