//! Row-format table storage
//!
//! Encodes and decodes the row-oriented table container and the JSON input
//! form. Buffers are read-only inputs: a decode builds an owned
//! [`RowTable`] and never keeps a reference into the caller's bytes.
//!
//! # Design Principles
//!
//! - Checksum-verified on every decode
//! - Tombstones mark rows, rows are never removed
//! - Self-describing values, one tag per cell
//! - Encoding always yields a complete buffer

mod checksum;
mod errors;
mod json;
mod meta;
mod record;
mod table;

pub use checksum::compute_checksum;
pub use errors::{FormatError, FormatResult};
pub use json::JsonTable;
pub use meta::{
    DataFormat, TableMeta, DATA_SCHEMA_VERSION, DATA_STRUCTURE_VERSION, NAME_DEFAULT,
    SKYHOOK_VERSION,
};
pub use record::Record;
pub use table::RowTable;
