//! Collection file writer
//!
//! Append-only: records are never rewritten in place. Every append is followed by
//! an fsync, and a write is not acknowledged until the fsync returns.
//!
//! A failed append is rolled back by truncating the file to the last good offset.
//! If that truncation fails too the writer is poisoned and retries it before the
//! next append, so no record is ever written after a torn one.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::warn;

use super::errors::{StorageError, StorageResult};
use super::reader::CollectionReader;
use super::record::CollectionRecord;

/// Append-only writer for one collection file.
pub struct CollectionWriter {
    collection: String,
    file: File,
    current_offset: u64,
    record_count: usize,
    poisoned: bool,
}

impl CollectionWriter {
    /// Opens or creates the collection file at `path`.
    ///
    /// Existing records are scanned once so a corrupted file is reported here rather
    /// than on some later read.
    pub fn open(path: &Path, collection: &str) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::write_failed(
                    collection,
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StorageError::write_failed(
                    collection,
                    format!("Failed to open collection file: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed(collection, "Failed to read file metadata", e))?
            .len();

        let record_count = if current_offset == 0 {
            0
        } else {
            CollectionReader::open(path, collection)?.read_all()?.len()
        };

        Ok(Self {
            collection: collection.to_string(),
            file,
            current_offset,
            record_count,
            poisoned: false,
        })
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Appends a record and fsyncs. Returns the offset it was written at.
    pub fn append(&mut self, record: &CollectionRecord) -> StorageResult<u64> {
        if self.poisoned {
            self.discard_tail()?;
        }

        let encoded = record.encode();
        let offset = self.current_offset;

        let written = self
            .file
            .write_all(&encoded)
            .map_err(|e| {
                StorageError::write_failed(
                    &self.collection,
                    format!("Failed to write document: {}", record.document_id),
                    e,
                )
            })
            .and_then(|()| {
                self.file.sync_all().map_err(|e| {
                    StorageError::write_failed(
                        &self.collection,
                        format!("fsync failed after writing document: {}", record.document_id),
                        e,
                    )
                })
            });

        if let Err(e) = written {
            if let Err(rollback) = self.discard_tail() {
                warn!(
                    collection = %self.collection,
                    error = %rollback,
                    "could not roll back failed append, writer poisoned"
                );
            }
            return Err(e);
        }

        self.current_offset += encoded.len() as u64;
        self.record_count += 1;
        Ok(offset)
    }

    /// Truncates anything past the last acknowledged record.
    fn discard_tail(&mut self) -> StorageResult<()> {
        let result = self
            .file
            .set_len(self.current_offset)
            .and_then(|()| self.file.sync_all());
        self.poisoned = result.is_err();
        result.map_err(|e| {
            StorageError::write_failed(
                &self.collection,
                format!("Failed to truncate to offset {}", self.current_offset),
                e,
            )
        })
    }
}
