//! Storage handle
//!
//! The one long-lived connection to the document store. It is built once at
//! startup, cloned into whatever needs it, and closed at shutdown.
//!
//! Lifecycle:
//! - [`StorageHandle::connect`] opens the file backend. If that fails the handle
//!   is returned in the unavailable state instead of erroring, so the service can
//!   still start and report the problem through [`StorageHandle::status`].
//! - While unavailable, `insert` and `find` fail fast with `StorageUnavailable`.
//!   Nothing reconnects or retries.
//! - [`StorageHandle::close`] releases the backend and leaves the handle unavailable.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::backend::{DocumentBackend, FileBackend, MemoryBackend};
use super::errors::{StorageError, StorageResult};
use super::filter::Filter;
use super::value::{Document, DocumentId, StoredValue, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::schema::ValidatedRecord;

/// Collections reported by [`StorageHandle::status`] are capped at this many.
pub const STATUS_COLLECTION_LIMIT: usize = 10;

const STATUS_DETAIL_MAX_CHARS: usize = 80;

/// Where the file backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub database_name: String,
}

/// Best-effort health summary. Building one never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStatus {
    pub connected: bool,
    pub collections: Vec<String>,
    pub detail: String,
}

enum Connection {
    Connected(Box<dyn DocumentBackend>),
    Unavailable(String),
}

/// Shared handle to the document store.
#[derive(Clone)]
pub struct StorageHandle {
    connection: Arc<RwLock<Connection>>,
}

impl StorageHandle {
    /// Opens the file backend described by `config`.
    ///
    /// Never fails: an unreachable store yields a handle in the unavailable state.
    pub fn connect(config: &StorageConfig) -> Self {
        match FileBackend::open(&config.data_dir, &config.database_name) {
            Ok(backend) => {
                info!(
                    database = %config.database_name,
                    root = %backend.root().display(),
                    "storage connected"
                );
                Self::with_backend(backend)
            }
            Err(e) => {
                warn!(error = %e, "storage unavailable, continuing in degraded mode");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Wraps an already-open backend.
    pub fn with_backend(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            connection: Arc::new(RwLock::new(Connection::Connected(Box::new(backend)))),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// A handle that was never connected.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            connection: Arc::new(RwLock::new(Connection::Unavailable(reason.into()))),
        }
    }

    pub fn is_connected(&self) -> bool {
        let guard = self.connection.read().unwrap_or_else(PoisonError::into_inner);
        matches!(&*guard, Connection::Connected(_))
    }

    /// Persists a validated record as a new document of `collection`.
    ///
    /// The identifier and the `created_at`/`updated_at` stamps are assigned here;
    /// the returned identifier is the one stored under `_id`.
    pub async fn insert(
        &self,
        collection: &str,
        record: ValidatedRecord,
    ) -> StorageResult<DocumentId> {
        let connection = Arc::clone(&self.connection);
        let collection = collection.to_string();
        let task_collection = collection.clone();

        let result = tokio::task::spawn_blocking(move || -> StorageResult<DocumentId> {
            let mut guard = connection
                .write()
                .map_err(|_| StorageError::unavailable("storage lock poisoned"))?;
            let backend = match &mut *guard {
                Connection::Connected(backend) => backend,
                Connection::Unavailable(reason) => {
                    return Err(StorageError::unavailable(reason.clone()))
                }
            };

            let id = DocumentId::generate();
            let now = Utc::now();
            let mut document: Document = record.into_fields();
            document.insert(ID_FIELD.to_string(), StoredValue::Id(id));
            document.insert(CREATED_AT_FIELD.to_string(), StoredValue::DateTime(now));
            document.insert(UPDATED_AT_FIELD.to_string(), StoredValue::DateTime(now));

            backend.insert(&task_collection, id, &document)?;
            Ok(id)
        })
        .await
        .map_err(|e| StorageError::write_rejected(&collection, format!("storage task failed: {}", e)))?;

        match &result {
            Ok(id) => info!(collection = %collection, id = %id, "document inserted"),
            Err(e) => warn!(collection = %collection, error = %e, "insert failed"),
        }
        result
    }

    /// Returns up to `limit` raw documents of `collection` matching `filter`.
    ///
    /// `limit == 0` returns an empty sequence without touching the backend, but
    /// still reports an unavailable store.
    pub async fn find(
        &self,
        collection: &str,
        filter: Filter,
        limit: usize,
    ) -> StorageResult<Vec<Document>> {
        let connection = Arc::clone(&self.connection);
        let collection = collection.to_string();
        let task_collection = collection.clone();

        let result = tokio::task::spawn_blocking(move || -> StorageResult<Vec<Document>> {
            let guard = connection
                .read()
                .map_err(|_| StorageError::unavailable("storage lock poisoned"))?;
            match &*guard {
                Connection::Unavailable(reason) => Err(StorageError::unavailable(reason.clone())),
                Connection::Connected(_) if limit == 0 => Ok(Vec::new()),
                Connection::Connected(backend) => backend.find(&task_collection, &filter, limit),
            }
        })
        .await
        .map_err(|e| StorageError::ReadFailed {
            collection: collection.clone(),
            message: format!("storage task failed: {}", e),
            source: None,
        })?;

        match &result {
            Ok(docs) => debug!(collection = %collection, count = docs.len(), "documents found"),
            Err(e) => warn!(collection = %collection, error = %e, "find failed"),
        }
        result
    }

    /// Summarizes connection health. Never fails and never panics.
    pub fn status(&self) -> StorageStatus {
        let guard = self.connection.read().unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            Connection::Unavailable(reason) => StorageStatus {
                connected: false,
                collections: Vec::new(),
                detail: truncate_detail(reason),
            },
            Connection::Connected(backend) => match backend.collection_names() {
                Ok(mut names) => {
                    names.truncate(STATUS_COLLECTION_LIMIT);
                    StorageStatus {
                        connected: true,
                        collections: names,
                        detail: format!("connected to {}", backend.describe()),
                    }
                }
                Err(e) => StorageStatus {
                    connected: true,
                    collections: Vec::new(),
                    detail: truncate_detail(&format!("connected but error: {}", e)),
                },
            },
        }
    }

    /// [`StorageHandle::status`] run on the blocking pool, for async callers.
    ///
    /// Building the summary may wait on an in-flight write and list the data
    /// directory, so it stays off the async workers.
    pub async fn current_status(&self) -> StorageStatus {
        let handle = self.clone();
        match tokio::task::spawn_blocking(move || handle.status()).await {
            Ok(status) => status,
            Err(e) => StorageStatus {
                connected: false,
                collections: Vec::new(),
                detail: truncate_detail(&format!("status task failed: {}", e)),
            },
        }
    }

    /// Closes the backend. Later operations fail with `StorageUnavailable`.
    pub fn close(&self) {
        let mut guard = self.connection.write().unwrap_or_else(PoisonError::into_inner);
        if let Connection::Connected(backend) = &mut *guard {
            if let Err(e) = backend.close() {
                warn!(error = %e, "error while closing storage");
            }
            info!("storage closed");
        }
        *guard = Connection::Unavailable("storage closed".to_string());
    }
}

fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= STATUS_DETAIL_MAX_CHARS {
        detail.to_string()
    } else {
        detail.chars().take(STATUS_DETAIL_MAX_CHARS).collect()
    }
}
