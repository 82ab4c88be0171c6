//! Collection file reader
//!
//! Every record read is checksum-verified. A short, truncated or corrupted record
//! aborts the read with `CARE_STORAGE_READ_FAILED`; nothing is skipped silently.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{CollectionRecord, MIN_RECORD_SIZE};

/// Sequential reader over one collection file.
pub struct CollectionReader {
    collection: String,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl CollectionReader {
    /// Opens a collection file for reading.
    pub fn open(path: &Path, collection: &str) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| {
            StorageError::read_failed(
                collection,
                format!("Failed to open collection file: {}", path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed(collection, "Failed to read file metadata", e))?
            .len();

        Ok(Self {
            collection: collection.to_string(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next record, or `None` at end of file.
    pub fn read_next(&mut self) -> StorageResult<Option<CollectionRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                &self.collection,
                self.current_offset,
                format!(
                    "Truncated collection file: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                &self.collection,
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 || record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                &self.collection,
                self.current_offset,
                format!(
                    "Invalid record length {} with {} bytes remaining",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                &self.collection,
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = CollectionRecord::decode(&record_buf).map_err(|e| {
            StorageError::corruption_at_offset(&self.collection, self.current_offset, e.to_string())
        })?;

        self.current_offset += consumed as u64;
        Ok(Some(record))
    }

    /// Reads all remaining records.
    pub fn read_all(&mut self) -> StorageResult<Vec<CollectionRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }
}
