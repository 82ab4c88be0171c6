//! Document storage for carebase
//!
//! One collection per declared record type. Documents are validated before they
//! reach this module and receive their identifier here, never from the caller.
//!
//! # Design Principles
//!
//! - Single long-lived handle, injected rather than global
//! - Append-only collection files, checksum-verified on every read
//! - Degraded mode instead of startup failure when the store is unreachable
//! - No implicit retries; every failure is surfaced to the caller

mod backend;
mod errors;
mod filter;
mod handle;
mod reader;
mod record;
mod value;
mod writer;

pub use backend::{DocumentBackend, FileBackend, MemoryBackend};
pub use errors::{StorageError, StorageResult};
pub use filter::Filter;
pub use handle::{StorageConfig, StorageHandle, StorageStatus, STATUS_COLLECTION_LIMIT};
pub use reader::CollectionReader;
pub use record::CollectionRecord;
pub use value::{
    Document, DocumentId, StoredValue, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
pub use writer::CollectionWriter;
