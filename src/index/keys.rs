//! Index key string construction
//!
//! Keys look like `IDX_REC:*-LINEITEM:LINENUMBER-ORDERKEY:00000000000000000001-00000000000000000006`.
//! The prefix covers everything up to and including the third `:`.

use std::fmt;

use crate::schema::ScalarType;
use crate::storage::NAME_DEFAULT;

/// Separates the key sections
pub const IDX_KEY_DELIM_OUTER: &str = ":";
/// Separates names and values inside a section
pub const IDX_KEY_DELIM_INNER: &str = "-";
/// Column section of a key built without columns
pub const IDX_KEY_COLS_DEFAULT: &str = "*";

/// Width of an unsigned 64-bit value printed in decimal
const U64_DIGITS: usize = 20;

/// Kind of index a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Flatbuffer (row container) index
    Fb = 1,
    /// Row-id index
    Rid = 2,
    /// Record (column value) index
    Rec = 3,
    /// Text index
    Txt = 4,
}

impl IndexType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(IndexType::Fb),
            2 => Some(IndexType::Rid),
            3 => Some(IndexType::Rec),
            4 => Some(IndexType::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Fb => "IDX_FB",
            IndexType::Rid => "IDX_RID",
            IndexType::Rec => "IDX_REC",
            IndexType::Txt => "IDX_TXT",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key prefix for an index over `cols` of `db_schema.table`.
///
/// Only row-id and record indexes name their columns.
pub fn build_key_prefix(
    idx_type: IndexType,
    db_schema: &str,
    table: &str,
    cols: &[String],
) -> String {
    let db_schema = match db_schema.trim() {
        "" => NAME_DEFAULT,
        s => s,
    };
    let table = match table.trim() {
        "" => NAME_DEFAULT,
        s => s,
    };
    let key_cols = if cols.is_empty() {
        IDX_KEY_COLS_DEFAULT.to_string()
    } else {
        match idx_type {
            IndexType::Rid | IndexType::Rec => cols.join(IDX_KEY_DELIM_INNER),
            IndexType::Fb | IndexType::Txt => String::new(),
        }
    };

    format!(
        "{ty}{o}{db}{i}{table}{o}{cols}{o}",
        ty = idx_type,
        db = db_schema,
        table = table,
        cols = key_cols,
        o = IDX_KEY_DELIM_OUTER,
        i = IDX_KEY_DELIM_INNER,
    )
}

/// Zero-padded value section of a key.
///
/// The value is printed with 20 digits and then cut to the decimal width
/// of its column type, so keys of one type sort like their values.
pub fn build_key_data(col_type: ScalarType, value: u64) -> String {
    let digits = format!("{:0width$}", value, width = U64_DIGITS);
    let keep = match col_type {
        ScalarType::Bool => 1,
        ScalarType::Char | ScalarType::UChar | ScalarType::Int8 | ScalarType::UInt8 => 3,
        ScalarType::Int16 | ScalarType::UInt16 => 5,
        ScalarType::Int32 | ScalarType::UInt32 => 10,
        _ => U64_DIGITS,
    };
    digits[U64_DIGITS - keep..].to_string()
}
