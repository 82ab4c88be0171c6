//! Collection record framing
//!
//! Each collection file is a sequence of records:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes itself and the checksum)
//! +------------------+
//! | Document ID      | (length-prefixed string)
//! +------------------+
//! | Collection       | (length-prefixed string)
//! +------------------+
//! | Document Body    | (length-prefixed bytes, tagged JSON)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32)
//! +------------------+
//! ```
//!
//! The checksum covers every byte before it.

use std::io::{self, Cursor, Read};

use crc32fast::Hasher;

use super::value::{Document, DocumentId};

/// Smallest possible record: length + three empty length prefixes + checksum.
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 4 + 4;

/// One framed document as stored in a collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub document_id: String,
    pub collection: String,
    pub body: Vec<u8>,
}

impl CollectionRecord {
    /// Frames a document for the given collection.
    pub fn from_document(
        collection: &str,
        document_id: DocumentId,
        document: &Document,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            document_id: document_id.to_string(),
            collection: collection.to_string(),
            body: serde_json::to_vec(document)?,
        })
    }

    /// Decodes the tagged body back into a document.
    pub fn document(&self) -> io::Result<Document> {
        serde_json::from_slice(&self.body).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid document body for {}: {}", self.document_id, e),
            )
        })
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            12 + self.document_id.len() + self.collection.len() + self.body.len(),
        );
        for field in [
            self.document_id.as_bytes(),
            self.collection.as_bytes(),
            self.body.as_slice(),
        ] {
            buf.extend_from_slice(&(field.len() as u32).to_le_bytes());
            buf.extend_from_slice(field);
        }
        buf
    }

    /// Encodes the full record including length prefix and checksum.
    pub fn encode(&self) -> Vec<u8> {
        let body = self.encode_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());
        record
    }

    /// Decodes a record from the front of `data`, verifying the checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Record too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }
        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed = checksum(&data[..checksum_offset]);
        if computed != stored {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed, stored
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);
        let document_id = read_string(&mut cursor)?;
        let collection = read_string(&mut cursor)?;
        let body = read_bytes(&mut cursor)?;

        Ok((
            Self {
                document_id,
                collection,
                body,
            },
            record_length,
        ))
    }
}

fn checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    String::from_utf8(read_bytes(reader)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::value::StoredValue;

    fn sample_record() -> CollectionRecord {
        let mut doc = Document::new();
        doc.insert("full_name".into(), StoredValue::from("Jane Doe"));
        CollectionRecord::from_document("carerequest", DocumentId::generate(), &doc).unwrap()
    }

    #[test]
    fn test_record_decodes_what_it_encodes() {
        let record = sample_record();
        let encoded = record.encode();
        let (decoded, consumed) = CollectionRecord::decode(&encoded).unwrap();

        assert_eq!(decoded, record);
        assert_eq!(consumed, encoded.len());
        assert_eq!(
            decoded.document().unwrap().get("full_name"),
            Some(&StoredValue::from("Jane Doe"))
        );
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut encoded = sample_record().encode();
        let mid = encoded.len() / 2;
        encoded[mid] ^= 0xFF;

        let err = CollectionRecord::decode(&encoded).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let encoded = sample_record().encode();
        let err = CollectionRecord::decode(&encoded[..encoded.len() - 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let record = sample_record();
        assert_eq!(record.encode(), record.encode());
    }
}
