//! Persistence
//!
//! The JSON record item metadata is stored in, and decoding with safe defaults.

pub mod record;

pub use record::{decode_metadata, encode_metadata, MetadataRecord, RecordError};
