//! Snapshot envelope encoding and decoding.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use settle_model::RecordCollection;

/// Current snapshot format version.
pub const FORMAT_VERSION: u16 = 1;

/// The on-the-wire snapshot shape: a format version plus the records.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    format_version: u16,
    records: RecordCollection,
}

/// Encodes a record collection into a versioned snapshot blob.
///
/// # Errors
///
/// Returns [`CodecError::Write`] if the underlying writer fails; a
/// well-formed in-memory collection cannot fail to encode.
pub fn encode_snapshot(records: &RecordCollection) -> CodecResult<Vec<u8>> {
    let envelope = SnapshotEnvelope {
        format_version: FORMAT_VERSION,
        records: records.clone(),
    };
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&envelope, &mut bytes)
        .map_err(|e| CodecError::Write(e.to_string()))?;
    Ok(bytes)
}

/// Decodes a snapshot blob into a record collection.
///
/// Absent sub-collections decode as absent and are treated as empty by
/// every set operation downstream.
///
/// # Errors
///
/// Returns [`CodecError::MalformedSnapshot`] for structurally invalid
/// input and [`CodecError::UnsupportedVersion`] when the blob declares
/// a format version newer than [`FORMAT_VERSION`].
pub fn decode_snapshot(bytes: &[u8]) -> CodecResult<RecordCollection> {
    let envelope: SnapshotEnvelope = ciborium::de::from_reader(bytes)
        .map_err(|e| CodecError::MalformedSnapshot(e.to_string()))?;

    if envelope.format_version > FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: envelope.format_version,
            supported: FORMAT_VERSION,
        });
    }

    Ok(envelope.records)
}
