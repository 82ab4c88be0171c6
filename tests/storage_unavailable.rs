//! Degraded Storage Tests
//!
//! An unreachable store must not stop the service from starting:
//! - `storage_status` reports the failure instead of failing
//! - submit and list fail fast with `StorageUnavailable`
//! - validation still runs first

use std::fs;
use std::sync::Arc;

use carebase::schema::builtin::CARE_REQUEST;
use carebase::schema::SchemaRegistry;
use carebase::service::DocumentService;
use carebase::storage::{Filter, StorageConfig, StorageHandle};
use serde_json::json;
use tempfile::TempDir;

fn unreachable_storage(dir: &TempDir) -> StorageHandle {
    // A regular file where the data directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    StorageHandle::connect(&StorageConfig {
        data_dir: blocker,
        database_name: "carebase".to_string(),
    })
}

fn service(storage: StorageHandle) -> DocumentService {
    let registry = Arc::new(SchemaRegistry::with_builtin_types().unwrap());
    DocumentService::new(registry, storage)
}

fn valid_request() -> serde_json::Value {
    json!({
        "full_name": "Jane Doe",
        "phone": "555-0100",
        "address": "12 Elm St",
        "services": ["companionship"]
    })
}

#[test]
fn test_failed_connect_degrades() {
    let dir = TempDir::new().unwrap();
    let storage = unreachable_storage(&dir);

    assert!(!storage.is_connected());
    let status = storage.status();
    assert!(!status.connected);
    assert!(!status.detail.is_empty());
    assert!(status.detail.chars().count() <= 80);
    assert!(status.collections.is_empty());
}

#[tokio::test]
async fn test_submit_and_list_fail_fast() {
    let dir = TempDir::new().unwrap();
    let service = service(unreachable_storage(&dir));

    let err = service.submit(CARE_REQUEST, &valid_request()).await.unwrap_err();
    assert_eq!(err.code(), "CARE_STORAGE_UNAVAILABLE");

    let err = service.list(CARE_REQUEST, Filter::new(), 10).await.unwrap_err();
    assert_eq!(err.code(), "CARE_STORAGE_UNAVAILABLE");

    // limit 0 still reports the outage
    let err = service.list(CARE_REQUEST, Filter::new(), 0).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_validation_precedes_storage() {
    let service = service(StorageHandle::unavailable("store offline"));
    let err = service.submit(CARE_REQUEST, &json!({})).await.unwrap_err();
    assert_eq!(err.code(), "CARE_VALIDATION_FAILED");
}

#[tokio::test]
async fn test_closed_handle_is_unavailable() {
    let storage = StorageHandle::in_memory();
    let service = service(storage.clone());
    service.submit(CARE_REQUEST, &valid_request()).await.unwrap();

    storage.close();

    let status = service.storage_status().await;
    assert!(!status.connected);
    assert_eq!(status.detail, "storage closed");
    assert!(service
        .submit(CARE_REQUEST, &valid_request())
        .await
        .unwrap_err()
        .is_unavailable());
}
