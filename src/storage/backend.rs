//! Document backends
//!
//! The storage handle talks to the store through [`DocumentBackend`]. Two backends
//! ship with the crate:
//!
//! - [`FileBackend`]: one append-only, checksummed record file per collection under
//!   `<data_dir>/<database_name>/`
//! - [`MemoryBackend`]: process-local maps, for tests and ephemeral runs

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::filter::Filter;
use super::reader::CollectionReader;
use super::record::CollectionRecord;
use super::value::{Document, DocumentId};
use super::writer::CollectionWriter;

const COLLECTION_FILE_EXTENSION: &str = "dat";

/// A document store reachable by collection name.
///
/// Implementations only persist and return documents; identifier assignment and
/// timestamping happen in the storage handle above them.
pub trait DocumentBackend: Send + Sync {
    /// Persists `document` as a new entry of `collection`.
    fn insert(&mut self, collection: &str, id: DocumentId, document: &Document) -> StorageResult<()>;

    /// Returns up to `limit` documents of `collection` matching `filter`, in
    /// insertion order. An unknown collection is empty.
    fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StorageResult<Vec<Document>>;

    /// Names of collections holding at least one document, sorted.
    fn collection_names(&self) -> StorageResult<Vec<String>>;

    /// Short human-readable location of the store.
    fn describe(&self) -> String;

    /// Releases backend resources. Called once at shutdown.
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// Collection names become file names, so only a conservative charset is allowed.
pub(crate) fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: HashMap<String, Vec<Document>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentBackend for MemoryBackend {
    fn insert(&mut self, collection: &str, _id: DocumentId, document: &Document) -> StorageResult<()> {
        if !is_valid_collection_name(collection) {
            return Err(StorageError::write_rejected(collection, "invalid collection name"));
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(())
    }

    fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StorageResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn collection_names(&self) -> StorageResult<Vec<String>> {
        let mut names: Vec<_> = self
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

/// File-backed store: `<root>/<collection>.dat` per collection.
pub struct FileBackend {
    root: PathBuf,
    writers: HashMap<String, CollectionWriter>,
}

impl FileBackend {
    /// Opens (creating if needed) the database directory `<data_dir>/<database_name>`.
    pub fn open(data_dir: &Path, database_name: &str) -> StorageResult<Self> {
        let root = data_dir.join(database_name);
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::unavailable(format!(
                "cannot open database directory {}: {}",
                root.display(),
                e
            ))
        })?;

        // Probe that the directory is readable before declaring the backend usable.
        fs::read_dir(&root).map_err(|e| {
            StorageError::unavailable(format!(
                "cannot read database directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            writers: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", collection, COLLECTION_FILE_EXTENSION))
    }

    fn writer(&mut self, collection: &str) -> StorageResult<&mut CollectionWriter> {
        if !self.writers.contains_key(collection) {
            let writer = CollectionWriter::open(&self.collection_path(collection), collection)?;
            self.writers.insert(collection.to_string(), writer);
        }
        self.writers
            .get_mut(collection)
            .ok_or_else(|| StorageError::write_rejected(collection, "collection writer missing"))
    }
}

impl DocumentBackend for FileBackend {
    fn insert(&mut self, collection: &str, id: DocumentId, document: &Document) -> StorageResult<()> {
        if !is_valid_collection_name(collection) {
            return Err(StorageError::write_rejected(collection, "invalid collection name"));
        }

        let record = CollectionRecord::from_document(collection, id, document).map_err(|e| {
            StorageError::write_rejected(collection, format!("document not encodable: {}", e))
        })?;
        self.writer(collection)?.append(&record)?;
        Ok(())
    }

    fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StorageResult<Vec<Document>> {
        let path = self.collection_path(collection);
        if limit == 0 || !is_valid_collection_name(collection) || !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = CollectionReader::open(&path, collection)?;
        let mut documents = Vec::new();
        while documents.len() < limit {
            let offset = reader.current_offset();
            let Some(record) = reader.read_next()? else {
                break;
            };
            let document = record.document().map_err(|e| {
                StorageError::corruption_at_offset(collection, offset, e.to_string())
            })?;
            if filter.matches(&document) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    fn collection_names(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            StorageError::read_failed("*", format!("cannot list {}", self.root.display()), e)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StorageError::read_failed("*", "failed to read directory entry", e)
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != COLLECTION_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        format!("file store at {}", self.root.display())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.writers.clear();
        Ok(())
    }
}
