//! Row records and the tagged value codec
//!
//! Record layout inside a row table body:
//!
//! ```text
//! +------------------+
//! | RID              | (i64 LE)
//! +------------------+
//! | Nullbit words    | (u32 LE count, then u64 LE words)
//! +------------------+
//! | Values           | (u32 LE count, then tagged values)
//! +------------------+
//! ```
//!
//! A tagged value is one tag byte (0 for null, otherwise the scalar type
//! code) followed by the payload. Jagged arrays carry a u32 element count
//! and then one tagged value per element.

use std::io::{self, Read};

use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{ColInfo, ScalarType, Value};

/// One row: row id, null bits and one value per column position
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub rid: i64,
    pub nullbits: Vec<u64>,
    pub values: Vec<Value>,
}

impl Record {
    /// Build a record, deriving null bits from `Value::Null` cells
    pub fn new(rid: i64, values: Vec<Value>) -> Self {
        let mut nullbits = vec![0u64; values.len().div_ceil(64).max(1)];
        for (pos, v) in values.iter().enumerate() {
            if v.is_null() {
                nullbits[pos / 64] |= 1 << (pos % 64);
            }
        }
        Self {
            rid,
            nullbits,
            values,
        }
    }

    /// Null bit for a column position
    pub fn is_null(&self, pos: usize) -> bool {
        self.nullbits
            .get(pos / 64)
            .map(|w| w & (1 << (pos % 64)) != 0)
            .unwrap_or(false)
    }

    /// Value at a column position, `None` past the end
    pub fn value(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// Cell for a column descriptor.
    ///
    /// The row id column reads the record's rid, every other column reads
    /// the value stored at its index. Null bits win over stored values.
    pub fn cell(&self, col: &ColInfo) -> QueryResult<Value> {
        if col.is_rid() {
            return Ok(Value::UInt64(self.rid as u64));
        }
        let pos = usize::try_from(col.idx).map_err(|_| oob(self.rid, col))?;
        if self.is_null(pos) {
            return Ok(Value::Null);
        }
        let value = self.value(pos).ok_or_else(|| oob(self.rid, col))?;
        if !value.fits(col.col_type) {
            return Err(QueryError::new(
                QueryErrorCode::ValueTypeMismatch,
                format!(
                    "rid={} col {} holds {:?}, expected {}",
                    self.rid, col.name, value, col.col_type
                ),
            ));
        }
        Ok(value.clone())
    }

    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.rid.to_le_bytes());
        buf.extend_from_slice(&(self.nullbits.len() as u32).to_le_bytes());
        for word in &self.nullbits {
            buf.extend_from_slice(&word.to_le_bytes());
        }
        buf.extend_from_slice(&(self.values.len() as u32).to_le_bytes());
        for value in &self.values {
            encode_value(buf, value);
        }
    }

    pub(crate) fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let rid = i64::from_le_bytes(read_array(reader)?);
        let words = read_u32(reader)? as usize;
        let mut nullbits = Vec::with_capacity(words.min(1024));
        for _ in 0..words {
            nullbits.push(u64::from_le_bytes(read_array(reader)?));
        }
        let count = read_u32(reader)? as usize;
        let mut values = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            values.push(decode_value(reader)?);
        }
        Ok(Self {
            rid,
            nullbits,
            values,
        })
    }
}

/// Append a tagged value
pub(crate) fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    let tag = value.scalar_type().map(|t| t.code() as u8).unwrap_or(0);
    buf.push(tag);
    match value {
        Value::Null => {}
        Value::Bool(v) => buf.push(u8::from(*v)),
        Value::Int8(v) | Value::Char(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Int16(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Int32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Int64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::UInt8(v) | Value::UChar(v) => buf.push(*v),
        Value::UInt16(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::UInt32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::UInt64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Float(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Double(v) => buf.extend_from_slice(&v.to_le_bytes()),
        Value::Date(s) | Value::Str(s) => put_str(buf, s),
        Value::List(_, items) => {
            buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                encode_value(buf, item);
            }
        }
    }
}

/// Read one tagged value
pub(crate) fn decode_value<R: Read>(reader: &mut R) -> io::Result<Value> {
    let [tag] = read_array::<R, 1>(reader)?;
    if tag == 0 {
        return Ok(Value::Null);
    }
    let scalar = ScalarType::from_code(i32::from(tag))
        .ok_or_else(|| invalid(format!("unknown value tag {}", tag)))?;

    let value = match scalar {
        ScalarType::Bool => Value::Bool(read_array::<R, 1>(reader)?[0] != 0),
        ScalarType::Int8 => Value::Int8(i8::from_le_bytes(read_array(reader)?)),
        ScalarType::Char => Value::Char(i8::from_le_bytes(read_array(reader)?)),
        ScalarType::Int16 => Value::Int16(i16::from_le_bytes(read_array(reader)?)),
        ScalarType::Int32 => Value::Int32(i32::from_le_bytes(read_array(reader)?)),
        ScalarType::Int64 => Value::Int64(i64::from_le_bytes(read_array(reader)?)),
        ScalarType::UInt8 => Value::UInt8(read_array::<R, 1>(reader)?[0]),
        ScalarType::UChar => Value::UChar(read_array::<R, 1>(reader)?[0]),
        ScalarType::UInt16 => Value::UInt16(u16::from_le_bytes(read_array(reader)?)),
        ScalarType::UInt32 => Value::UInt32(u32::from_le_bytes(read_array(reader)?)),
        ScalarType::UInt64 => Value::UInt64(u64::from_le_bytes(read_array(reader)?)),
        ScalarType::Float => Value::Float(f32::from_le_bytes(read_array(reader)?)),
        ScalarType::Double => Value::Double(f64::from_le_bytes(read_array(reader)?)),
        ScalarType::Date => Value::Date(read_str(reader)?),
        ScalarType::String => Value::Str(read_str(reader)?),
        jagged => {
            let elem = jagged
                .element_type()
                .ok_or_else(|| invalid(format!("bad list tag {}", tag)))?;
            let count = read_u32(reader)? as usize;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(decode_value(reader)?);
            }
            Value::List(elem, items)
        }
    };
    Ok(value)
}

pub(crate) fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

pub(crate) fn read_str<R: Read>(reader: &mut R) -> io::Result<String> {
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| invalid(format!("invalid UTF-8: {}", e)))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

pub(crate) fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn oob(rid: i64, col: &ColInfo) -> QueryError {
    QueryError::new(
        QueryErrorCode::RequestedColIndexOOB,
        format!("rid={} col.idx={} OOB.", rid, col.idx),
    )
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}
