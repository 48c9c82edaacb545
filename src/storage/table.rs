//! Row-format table container
//!
//! ```text
//! +------------------------+
//! | Total Length           | (u32 LE)
//! +------------------------+
//! | Magic "SKYR"           |
//! +------------------------+
//! | Version quadruple      | (4 x u32 LE)
//! +------------------------+
//! | Data schema            | (length-prefixed string)
//! | DB schema              | (length-prefixed string)
//! | Table name             | (length-prefixed string)
//! +------------------------+
//! | Row count              | (u32 LE)
//! +------------------------+
//! | Delete vector          | (one byte per row, 0 = live, 1 = deleted)
//! +------------------------+
//! | Records                | (see record.rs)
//! +------------------------+
//! | Checksum               | (u32 LE)
//! +------------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::Cursor;

use super::checksum::compute_checksum;
use super::errors::{FormatError, FormatResult};
use super::meta::{DataFormat, TableMeta};
use super::record::{put_str, read_array, read_str, read_u32, Record};
use crate::errors::QueryResult;
use crate::schema::Schema;

const MAGIC: &[u8; 4] = b"SKYR";
const MIN_TABLE_SIZE: usize = 4 + 4 + 16 + 4 * 3 + 4 + 4;

/// Row-encoded table: metadata, tombstones and records
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    pub meta: TableMeta,
    /// One entry per row, 1 marks a deleted row
    pub delete_vector: Vec<u8>,
    pub rows: Vec<Record>,
}

impl RowTable {
    /// Empty row table for a schema
    pub fn new(schema: &Schema, db_schema: &str, table_name: &str) -> Self {
        Self::with_meta(TableMeta::new(DataFormat::RowFlex, schema, db_schema, table_name))
    }

    /// Empty row table carrying existing metadata
    pub fn with_meta(meta: TableMeta) -> Self {
        Self {
            meta: TableMeta { nrows: 0, ..meta },
            delete_vector: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a live row
    pub fn push(&mut self, record: Record) {
        self.push_with_flag(record, false);
    }

    /// Append a row with an explicit tombstone flag
    pub fn push_with_flag(&mut self, record: Record, deleted: bool) {
        self.rows.push(record);
        self.delete_vector.push(u8::from(deleted));
        self.meta.nrows = self.rows.len() as u64;
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_deleted(&self, rnum: usize) -> bool {
        self.delete_vector.get(rnum).copied() == Some(1)
    }

    pub fn schema(&self) -> QueryResult<Schema> {
        self.meta.schema()
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);

        buf.extend_from_slice(&self.meta.skyhook_version.to_le_bytes());
        buf.extend_from_slice(&self.meta.data_format_type.to_le_bytes());
        buf.extend_from_slice(&self.meta.data_structure_version.to_le_bytes());
        buf.extend_from_slice(&self.meta.data_schema_version.to_le_bytes());

        put_str(&mut buf, &self.meta.data_schema);
        put_str(&mut buf, &self.meta.db_schema);
        put_str(&mut buf, &self.meta.table_name);

        buf.extend_from_slice(&(self.rows.len() as u32).to_le_bytes());
        for rnum in 0..self.rows.len() {
            buf.push(u8::from(self.is_deleted(rnum)));
        }

        for record in &self.rows {
            record.encode(&mut buf);
        }
        buf
    }

    /// Serialize to a complete, checksummed buffer
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let total_length = (4 + body.len() + 4) as u32;

        let mut out = Vec::with_capacity(total_length as usize);
        out.extend_from_slice(&total_length.to_le_bytes());
        out.extend_from_slice(&body);
        let checksum = compute_checksum(&out);
        out.extend_from_slice(&checksum.to_le_bytes());
        out
    }

    /// Deserialize a buffer, verifying length, magic and checksum
    pub fn deserialize(data: &[u8]) -> FormatResult<Self> {
        if data.len() < MIN_TABLE_SIZE {
            return Err(FormatError::corrupt("row table too short"));
        }

        let total_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if total_length < MIN_TABLE_SIZE || total_length > data.len() {
            return Err(FormatError::corrupt(format!(
                "invalid row table length {} for {} bytes",
                total_length,
                data.len()
            )));
        }

        let checksum_offset = total_length - 4;
        let stored = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed = compute_checksum(&data[..checksum_offset]);
        if computed != stored {
            return Err(FormatError::corrupt(format!(
                "checksum mismatch: computed {:08x}, stored {:08x}",
                computed, stored
            )));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);
        let magic: [u8; 4] = read_array(&mut cursor)?;
        if &magic != MAGIC {
            return Err(FormatError::corrupt("not a row table"));
        }

        let skyhook_version = read_u32(&mut cursor)?;
        let data_format_type = read_u32(&mut cursor)?;
        let data_structure_version = read_u32(&mut cursor)?;
        let data_schema_version = read_u32(&mut cursor)?;
        let data_schema = read_str(&mut cursor)?;
        let db_schema = read_str(&mut cursor)?;
        let table_name = read_str(&mut cursor)?;

        let nrows = read_u32(&mut cursor)? as usize;
        let remaining = checksum_offset - 4 - cursor.position() as usize;
        if nrows > remaining {
            return Err(FormatError::corrupt(format!(
                "row count {} exceeds buffer",
                nrows
            )));
        }
        let mut delete_vector = vec![0u8; nrows];
        std::io::Read::read_exact(&mut cursor, &mut delete_vector)?;

        let mut rows = Vec::with_capacity(nrows);
        for _ in 0..nrows {
            rows.push(Record::decode(&mut cursor)?);
        }

        if cursor.position() as usize != checksum_offset - 4 {
            return Err(FormatError::corrupt("trailing bytes after records"));
        }

        Ok(Self {
            meta: TableMeta {
                skyhook_version,
                data_format_type,
                data_structure_version,
                data_schema_version,
                data_schema,
                db_schema,
                table_name,
                nrows: nrows as u64,
            },
            delete_vector,
            rows,
        })
    }
}
