//! Schema loader for extra record types
//!
//! Reads every `*.json` file in a directory at startup, one record type per file,
//! in file-name order. A missing directory or a malformed file fails startup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use super::types::RecordType;

/// Loads record type definitions from a directory.
pub struct SchemaLoader {
    schema_dir: PathBuf,
}

impl SchemaLoader {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
        }
    }

    /// Registers every record type found in the directory.
    ///
    /// Returns the number of types registered.
    pub fn load_into(&self, registry: &mut SchemaRegistry) -> SchemaResult<usize> {
        let dir = self.schema_dir.display().to_string();
        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(&dir, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(&dir, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let record_type = Self::read_file(path)?;
            info!(
                record_type = %record_type.name,
                path = %path.display(),
                "loaded record type"
            );
            registry.register(record_type)?;
        }

        Ok(paths.len())
    }

    fn read_file(path: &Path) -> SchemaResult<RecordType> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_loads_json_record_types() {
        let dir = TempDir::new().unwrap();
        let booking = json!({
            "name": "Booking",
            "fields": [
                {"name": "care_request_id", "type": "string", "required": true},
                {"name": "day", "type": "date", "required": true},
                {"name": "hours", "type": "int", "min": 1, "max": 12, "required": true},
                {"name": "status", "type": "enum", "values": ["pending", "confirmed"],
                 "required": false, "default": "pending"}
            ]
        });
        write(dir.path(), "booking.json", &booking.to_string());
        write(dir.path(), "README.txt", "not a schema");

        let mut registry = SchemaRegistry::with_builtin_types().unwrap();
        let loaded = SchemaLoader::new(dir.path()).load_into(&mut registry).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(registry.collection_name_for("Booking").unwrap(), "booking");
        assert_eq!(registry.get("booking").unwrap().fields.len(), 4);
    }

    #[test]
    fn test_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.json", "{ not json");

        let mut registry = SchemaRegistry::new();
        let err = SchemaLoader::new(dir.path()).load_into(&mut registry).unwrap_err();
        assert_eq!(err.code(), "CARE_MALFORMED_SCHEMA");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let mut registry = SchemaRegistry::new();
        let err = SchemaLoader::new(dir.path().join("absent"))
            .load_into(&mut registry)
            .unwrap_err();
        assert_eq!(err.code(), "CARE_MALFORMED_SCHEMA");
    }

    #[test]
    fn test_builtin_name_clash_fails() {
        let dir = TempDir::new().unwrap();
        let clash = json!({"name": "careRequest", "fields": []});
        write(dir.path(), "clash.json", &clash.to_string());

        let mut registry = SchemaRegistry::with_builtin_types().unwrap();
        let err = SchemaLoader::new(dir.path()).load_into(&mut registry).unwrap_err();
        assert_eq!(err.code(), "CARE_DUPLICATE_COLLECTION");
    }
}
