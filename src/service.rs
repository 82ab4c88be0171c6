//! Document service
//!
//! Composes the schema registry, the validator, the storage handle and the
//! sanitizer into the operations callers use: `submit`, `list` and
//! `storage_status`. Validation always happens before storage is touched.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::sanitizer;
use crate::schema::{SchemaError, SchemaRegistry, SchemaValidator, UnknownFieldPolicy};
use crate::storage::{DocumentId, Filter, StorageError, StorageHandle, StorageStatus};

/// Default number of records returned by `list` when no limit is given.
pub const DEFAULT_LIMIT: usize = 50;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the document service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Schema(e) => e.code(),
            ServiceError::Storage(e) => e.code(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ServiceError::Storage(e) if e.is_unavailable())
    }
}

/// Typed document store front door.
#[derive(Clone)]
pub struct DocumentService {
    registry: Arc<SchemaRegistry>,
    storage: StorageHandle,
    unknown_fields: UnknownFieldPolicy,
}

impl DocumentService {
    pub fn new(registry: Arc<SchemaRegistry>, storage: StorageHandle) -> Self {
        Self {
            registry,
            storage,
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &StorageHandle {
        &self.storage
    }

    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    /// Validates `payload` as a `type_name` record and persists it.
    ///
    /// Returns the identifier assigned by storage. A payload that fails
    /// validation never reaches storage.
    pub async fn submit(&self, type_name: &str, payload: &Value) -> ServiceResult<DocumentId> {
        let record = SchemaValidator::new(&self.registry)
            .with_unknown_fields(self.unknown_fields)
            .validate(type_name, payload)?;

        let collection = record.collection().to_string();
        let id = self.storage.insert(&collection, record).await?;
        info!(record_type = %type_name, collection = %collection, id = %id, "record submitted");
        Ok(id)
    }

    /// Returns up to `limit` sanitized records of `type_name` matching `filter`.
    pub async fn list(
        &self,
        type_name: &str,
        filter: Filter,
        limit: usize,
    ) -> ServiceResult<Vec<Value>> {
        let collection = self.registry.collection_name_for(type_name)?.to_string();
        let documents = self.storage.find(&collection, filter, limit).await?;
        debug!(collection = %collection, count = documents.len(), "records listed");

        Ok(documents.iter().map(sanitizer::to_transport_json).collect())
    }

    /// Storage health summary. Never fails.
    pub async fn storage_status(&self) -> StorageStatus {
        self.storage.current_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin::{CAREGIVER, CARE_REQUEST};
    use serde_json::json;

    fn service() -> DocumentService {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        DocumentService::new(Arc::new(registry), StorageHandle::in_memory())
    }

    fn care_request() -> Value {
        json!({
            "full_name": "Jane Doe",
            "phone": "555-0100",
            "address": "12 Elm St",
            "services": ["companionship"]
        })
    }

    #[tokio::test]
    async fn test_submit_then_list() {
        let service = service();
        let id = service.submit(CARE_REQUEST, &care_request()).await.unwrap();

        let records = service.list(CARE_REQUEST, Filter::new(), DEFAULT_LIMIT).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!(id.to_string()));
        assert_eq!(records[0]["full_name"], json!("Jane Doe"));
        assert!(records[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_storage() {
        let service = service();
        let mut payload = care_request();
        payload["services"] = json!(["gardening"]);

        let err = service.submit(CARE_REQUEST, &payload).await.unwrap_err();
        assert_eq!(err.code(), "CARE_VALIDATION_FAILED");
        assert!(service.list(CARE_REQUEST, Filter::new(), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let service = service();
        let err = service.list("Booking", Filter::new(), 10).await.unwrap_err();
        assert_eq!(err.code(), "CARE_UNKNOWN_TYPE");

        let err = service.submit("Booking", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "CARE_UNKNOWN_TYPE");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_extra_fields() {
        let service = service().with_unknown_fields(UnknownFieldPolicy::Reject);
        let mut payload = care_request();
        payload["favourite_colour"] = json!("green");

        let err = service.submit(CARE_REQUEST, &payload).await.unwrap_err();
        match err {
            ServiceError::Schema(schema) => {
                assert!(schema.as_validation().unwrap().names_field("favourite_colour"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_types_land_in_separate_collections() {
        let service = service();
        service.submit(CARE_REQUEST, &care_request()).await.unwrap();
        service
            .submit(CAREGIVER, &json!({"name": "Ana", "years_experience": 4}))
            .await
            .unwrap();

        let caregivers = service.list(CAREGIVER, Filter::new(), 10).await.unwrap();
        assert_eq!(caregivers.len(), 1);
        assert_eq!(caregivers[0]["can_overnight"], json!(false));
        assert_eq!(
            service.storage_status().await.collections,
            vec!["caregiver".to_string(), "carerequest".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unavailable_storage() {
        let registry = SchemaRegistry::with_builtin_types().unwrap();
        let service = DocumentService::new(Arc::new(registry), StorageHandle::unavailable("down"));

        let err = service.submit(CARE_REQUEST, &care_request()).await.unwrap_err();
        assert!(err.is_unavailable());
        let err = service.list(CARE_REQUEST, Filter::new(), 5).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(!service.storage_status().await.connected);
    }
}
