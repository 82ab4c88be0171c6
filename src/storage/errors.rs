//! Storage error types
//!
//! Error codes:
//! - CARE_STORAGE_UNAVAILABLE: no usable connection to the document store
//! - CARE_STORAGE_WRITE_FAILED: the store rejected or failed a write
//! - CARE_STORAGE_READ_FAILED: the store failed a read (I/O or checksum)
//!
//! None of these are retried by the storage layer.

use std::io;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage errors surfaced to callers
#[derive(Debug, Error)]
pub enum StorageError {
    /// No connection to the store
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store rejected or failed a write
    #[error("write to collection '{collection}' failed: {message}")]
    WriteFailed {
        collection: String,
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The store failed a read
    #[error("read from collection '{collection}' failed: {message}")]
    ReadFailed {
        collection: String,
        message: String,
        #[source]
        source: Option<io::Error>,
    },
}

impl StorageError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StorageError::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn write_failed(
        collection: impl Into<String>,
        message: impl Into<String>,
        source: io::Error,
    ) -> Self {
        StorageError::WriteFailed {
            collection: collection.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Write failure that did not come from the filesystem
    pub fn write_rejected(collection: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::WriteFailed {
            collection: collection.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn read_failed(
        collection: impl Into<String>,
        message: impl Into<String>,
        source: io::Error,
    ) -> Self {
        StorageError::ReadFailed {
            collection: collection.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Checksum or framing failure at a byte offset of a collection file
    pub fn corruption_at_offset(
        collection: impl Into<String>,
        offset: u64,
        reason: impl Into<String>,
    ) -> Self {
        StorageError::ReadFailed {
            collection: collection.into(),
            message: format!("{} (byte_offset: {})", reason.into(), offset),
            source: None,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Unavailable { .. } => "CARE_STORAGE_UNAVAILABLE",
            StorageError::WriteFailed { .. } => "CARE_STORAGE_WRITE_FAILED",
            StorageError::ReadFailed { .. } => "CARE_STORAGE_READ_FAILED",
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes() {
        assert_eq!(StorageError::unavailable("x").code(), "CARE_STORAGE_UNAVAILABLE");
        assert_eq!(
            StorageError::write_rejected("c", "x").code(),
            "CARE_STORAGE_WRITE_FAILED"
        );
        assert_eq!(
            StorageError::corruption_at_offset("c", 0, "x").code(),
            "CARE_STORAGE_READ_FAILED"
        );
    }

    #[test]
    fn test_write_failed_keeps_io_source() {
        let err = StorageError::write_failed(
            "carerequest",
            "disk full",
            io::Error::new(io::ErrorKind::Other, "no space left"),
        );
        assert!(err.source().is_some());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_corruption_display_contains_offset() {
        let err = StorageError::corruption_at_offset("caregiver", 1024, "checksum mismatch");
        let display = err.to_string();
        assert!(display.contains("caregiver"));
        assert!(display.contains("checksum mismatch"));
        assert!(display.contains("byte_offset: 1024"));
    }
}
