//! Scalar type table and column descriptors
//!
//! Type codes are part of the textual schema grammar, so they are fixed:
//!
//! - 1..=15: scalar types (INT8 through STRING)
//! - 16..=28: jagged-array variants of BOOL, CHAR, UCHAR and the numerics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column index of the synthetic row-id column
pub const RID_COL_INDEX: i32 = -1;
/// Column index of a projected MIN aggregate
pub const AGG_COL_MIN: i32 = -2;
/// Column index of a projected MAX aggregate
pub const AGG_COL_MAX: i32 = -3;
/// Column index of a projected SUM aggregate
pub const AGG_COL_SUM: i32 = -4;
/// Column index of a projected CNT aggregate
pub const AGG_COL_CNT: i32 = -5;
/// Lower bound sentinel for synthetic column indices
pub const AGG_COL_LAST: i32 = -6;

/// Name of the row-id column, in schemas and in columnar tables
pub const RID_COL_NAME: &str = "RID";
/// Name of the trailing delete-flag column in columnar tables
pub const DELETED_VECTOR_COL_NAME: &str = "DELETED_VECTOR";

/// Number of whitespace separated fields in a column descriptor
pub const NUM_COL_INFO_FIELDS: usize = 5;

/// Scalar type tag of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarType {
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    UInt8 = 5,
    UInt16 = 6,
    UInt32 = 7,
    UInt64 = 8,
    Char = 9,
    UChar = 10,
    Bool = 11,
    Float = 12,
    Double = 13,
    Date = 14,
    String = 15,
    JaggedBool = 16,
    JaggedChar = 17,
    JaggedUChar = 18,
    JaggedInt8 = 19,
    JaggedInt16 = 20,
    JaggedInt32 = 21,
    JaggedInt64 = 22,
    JaggedUInt8 = 23,
    JaggedUInt16 = 24,
    JaggedUInt32 = 25,
    JaggedUInt64 = 26,
    JaggedFloat = 27,
    JaggedDouble = 28,
}

/// Canonical comparison domain a scalar type is promoted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Signed,
    Unsigned,
    Float,
    Bool,
    Date,
    Text,
    List,
}

impl ScalarType {
    const ALL: [ScalarType; 28] = [
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt8,
        ScalarType::UInt16,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::Char,
        ScalarType::UChar,
        ScalarType::Bool,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::Date,
        ScalarType::String,
        ScalarType::JaggedBool,
        ScalarType::JaggedChar,
        ScalarType::JaggedUChar,
        ScalarType::JaggedInt8,
        ScalarType::JaggedInt16,
        ScalarType::JaggedInt32,
        ScalarType::JaggedInt64,
        ScalarType::JaggedUInt8,
        ScalarType::JaggedUInt16,
        ScalarType::JaggedUInt32,
        ScalarType::JaggedUInt64,
        ScalarType::JaggedFloat,
        ScalarType::JaggedDouble,
    ];

    /// Look up a type by its numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Returns the numeric code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Returns the upper-case type name
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int8 => "INT8",
            ScalarType::Int16 => "INT16",
            ScalarType::Int32 => "INT32",
            ScalarType::Int64 => "INT64",
            ScalarType::UInt8 => "UINT8",
            ScalarType::UInt16 => "UINT16",
            ScalarType::UInt32 => "UINT32",
            ScalarType::UInt64 => "UINT64",
            ScalarType::Char => "CHAR",
            ScalarType::UChar => "UCHAR",
            ScalarType::Bool => "BOOL",
            ScalarType::Float => "FLOAT",
            ScalarType::Double => "DOUBLE",
            ScalarType::Date => "DATE",
            ScalarType::String => "STRING",
            ScalarType::JaggedBool => "JAGGEDARRAY_BOOL",
            ScalarType::JaggedChar => "JAGGEDARRAY_CHAR",
            ScalarType::JaggedUChar => "JAGGEDARRAY_UCHAR",
            ScalarType::JaggedInt8 => "JAGGEDARRAY_INT8",
            ScalarType::JaggedInt16 => "JAGGEDARRAY_INT16",
            ScalarType::JaggedInt32 => "JAGGEDARRAY_INT32",
            ScalarType::JaggedInt64 => "JAGGEDARRAY_INT64",
            ScalarType::JaggedUInt8 => "JAGGEDARRAY_UINT8",
            ScalarType::JaggedUInt16 => "JAGGEDARRAY_UINT16",
            ScalarType::JaggedUInt32 => "JAGGEDARRAY_UINT32",
            ScalarType::JaggedUInt64 => "JAGGEDARRAY_UINT64",
            ScalarType::JaggedFloat => "JAGGEDARRAY_FLOAT",
            ScalarType::JaggedDouble => "JAGGEDARRAY_DOUBLE",
        }
    }

    /// Element type of a jagged-array type, `None` for scalars
    pub fn element_type(&self) -> Option<ScalarType> {
        let inner = match self {
            ScalarType::JaggedBool => ScalarType::Bool,
            ScalarType::JaggedChar => ScalarType::Char,
            ScalarType::JaggedUChar => ScalarType::UChar,
            ScalarType::JaggedInt8 => ScalarType::Int8,
            ScalarType::JaggedInt16 => ScalarType::Int16,
            ScalarType::JaggedInt32 => ScalarType::Int32,
            ScalarType::JaggedInt64 => ScalarType::Int64,
            ScalarType::JaggedUInt8 => ScalarType::UInt8,
            ScalarType::JaggedUInt16 => ScalarType::UInt16,
            ScalarType::JaggedUInt32 => ScalarType::UInt32,
            ScalarType::JaggedUInt64 => ScalarType::UInt64,
            ScalarType::JaggedFloat => ScalarType::Float,
            ScalarType::JaggedDouble => ScalarType::Double,
            _ => return None,
        };
        Some(inner)
    }

    /// Jagged-array type whose elements are `inner`
    pub fn jagged_of(inner: ScalarType) -> Option<ScalarType> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.element_type() == Some(inner))
    }

    /// Returns true for jagged-array types
    pub fn is_jagged(&self) -> bool {
        self.element_type().is_some()
    }

    /// Comparison domain after promotion.
    ///
    /// CHAR and UCHAR compare as integers except for `like`, which the
    /// filter routes to text matching itself.
    pub fn domain(&self) -> Domain {
        match self {
            ScalarType::Int8
            | ScalarType::Int16
            | ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Char => Domain::Signed,
            ScalarType::UInt8
            | ScalarType::UInt16
            | ScalarType::UInt32
            | ScalarType::UInt64
            | ScalarType::UChar => Domain::Unsigned,
            ScalarType::Float | ScalarType::Double => Domain::Float,
            ScalarType::Bool => Domain::Bool,
            ScalarType::Date => Domain::Date,
            ScalarType::String => Domain::Text,
            _ => Domain::List,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColInfo {
    /// Ordinal index, negative for synthetic columns
    pub idx: i32,
    /// Scalar type tag
    pub col_type: ScalarType,
    /// Key flag
    pub is_key: bool,
    /// Nullability flag
    pub nullable: bool,
    /// Column name
    pub name: String,
}

impl ColInfo {
    pub fn new(
        idx: i32,
        col_type: ScalarType,
        is_key: bool,
        nullable: bool,
        name: impl Into<String>,
    ) -> Self {
        Self {
            idx,
            col_type,
            is_key,
            nullable,
            name: name.into(),
        }
    }

    /// The synthetic row-id descriptor
    pub fn rid() -> Self {
        Self::new(RID_COL_INDEX, ScalarType::UInt64, true, false, RID_COL_NAME)
    }

    /// Returns true if this is the row-id column
    pub fn is_rid(&self) -> bool {
        self.idx == RID_COL_INDEX
    }

    /// Exact name match
    pub fn compare_name(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for ColInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.idx,
            self.col_type.code(),
            u8::from(self.is_key),
            u8::from(self.nullable),
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 1..=28 {
            let t = ScalarType::from_code(code).unwrap();
            assert_eq!(t.code(), code);
        }
        assert!(ScalarType::from_code(0).is_none());
        assert!(ScalarType::from_code(29).is_none());
    }

    #[test]
    fn test_jagged_element_types() {
        assert_eq!(ScalarType::JaggedInt32.element_type(), Some(ScalarType::Int32));
        assert!(ScalarType::JaggedDouble.is_jagged());
        assert!(!ScalarType::String.is_jagged());
        assert_eq!(ScalarType::jagged_of(ScalarType::UChar), Some(ScalarType::JaggedUChar));
        assert_eq!(ScalarType::jagged_of(ScalarType::Date), None);
    }

    #[test]
    fn test_char_promotes_to_signed() {
        assert_eq!(ScalarType::Char.domain(), Domain::Signed);
        assert_eq!(ScalarType::UChar.domain(), Domain::Unsigned);
        assert_eq!(ScalarType::Float.domain(), Domain::Float);
    }

    #[test]
    fn test_col_info_display() {
        let ci = ColInfo::new(3, ScalarType::Double, false, true, "PRICE");
        assert_eq!(ci.to_string(), "3 13 0 1 PRICE");
        assert_eq!(ColInfo::rid().to_string(), "-1 8 1 0 RID");
    }
}
