//! # Settle Codec
//!
//! Versioned CBOR snapshot encoding/decoding for Settle.
//!
//! A snapshot blob is a CBOR map carrying a format version and the
//! serialized record collection. The codec is pure and stateless:
//!
//! - `decode_snapshot(encode_snapshot(x))` is content-equal to `x` for
//!   every well-formed collection
//! - Absent sub-collections are preserved as absent, and a decoder
//!   treats them as empty sets
//! - Structurally invalid input fails with
//!   [`CodecError::MalformedSnapshot`] rather than guessing
//!
//! ## Usage
//!
//! ```
//! use settle_codec::{decode_snapshot, encode_snapshot};
//! use settle_model::{RecordCollection, ValueRecord};
//!
//! let mut collection = RecordCollection::new();
//! collection.keywords = Some(vec![ValueRecord::new("spam")]);
//!
//! let bytes = encode_snapshot(&collection).unwrap();
//! let decoded = decode_snapshot(&bytes).unwrap();
//! assert!(decoded.content_equals(&collection));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod snapshot;

pub use error::{CodecError, CodecResult};
pub use snapshot::{decode_snapshot, encode_snapshot, FORMAT_VERSION};
