//! Tagged cell values
//!
//! Rows carry one self-describing [`Value`] per column. Readers ask for a
//! concrete type with [`Value::get`], which fails with
//! `SKY_VALUE_TYPE_MISMATCH` instead of reinterpreting bytes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::types::{Domain, ScalarType};
use crate::errors::{QueryError, QueryErrorCode, QueryResult};

/// One cell of a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Char(i8),
    UChar(u8),
    Float(f32),
    Double(f64),
    Date(String),
    Str(String),
    /// Jagged array, tagged with its element type
    List(ScalarType, Vec<Value>),
}

impl Value {
    /// Scalar type carried by this value, `None` for null
    pub fn scalar_type(&self) -> Option<ScalarType> {
        let t = match self {
            Value::Null => return None,
            Value::Bool(_) => ScalarType::Bool,
            Value::Int8(_) => ScalarType::Int8,
            Value::Int16(_) => ScalarType::Int16,
            Value::Int32(_) => ScalarType::Int32,
            Value::Int64(_) => ScalarType::Int64,
            Value::UInt8(_) => ScalarType::UInt8,
            Value::UInt16(_) => ScalarType::UInt16,
            Value::UInt32(_) => ScalarType::UInt32,
            Value::UInt64(_) => ScalarType::UInt64,
            Value::Char(_) => ScalarType::Char,
            Value::UChar(_) => ScalarType::UChar,
            Value::Float(_) => ScalarType::Float,
            Value::Double(_) => ScalarType::Double,
            Value::Date(_) => ScalarType::Date,
            Value::Str(_) => ScalarType::String,
            Value::List(elem, _) => return ScalarType::jagged_of(*elem),
        };
        Some(t)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Typed read. Fails on a variant that does not hold `T`.
    pub fn get<T: FromValue>(&self) -> QueryResult<T> {
        T::from_value(self).ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::ValueTypeMismatch,
                format!("value {:?} is not a {}", self, T::TYPE_NAME),
            )
        })
    }

    /// Promote to the signed 64-bit domain
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) | Value::Char(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Promote to the unsigned 64-bit domain
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt8(v) | Value::UChar(v) => Some(u64::from(*v)),
            Value::UInt16(v) => Some(u64::from(*v)),
            Value::UInt32(v) => Some(u64::from(*v)),
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Promote to the double domain
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a date or string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Date(s) | Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// String form used as a group-by key component
    pub fn key_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(v) => v.to_string(),
            Value::Int8(v) | Value::Char(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::UInt8(v) | Value::UChar(v) => v.to_string(),
            Value::UInt16(v) => v.to_string(),
            Value::UInt32(v) => v.to_string(),
            Value::UInt64(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Date(s) | Value::Str(s) => s.clone(),
            Value::List(_, items) => items
                .iter()
                .map(Value::key_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Group-by key component. Null is kept apart from every non-null cell.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.key_string()),
        }
    }

    /// Total order used by order-by.
    ///
    /// Values are compared inside their promoted domain. Nulls sort first,
    /// NaN compares equal to everything.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => return Ordering::Equal,
            (Value::Null, _) => return Ordering::Less,
            (_, Value::Null) => return Ordering::Greater,
            _ => {}
        }
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return a.cmp(&b);
        }
        if let (Some(a), Some(b)) = (self.as_u64(), other.as_u64()) {
            return a.cmp(&b);
        }
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        if let (Some(a), Some(b)) = (self.as_bool(), other.as_bool()) {
            return a.cmp(&b);
        }
        if let (Some(a), Some(b)) = (self.as_str(), other.as_str()) {
            return a.cmp(b);
        }
        if let (Value::List(_, a), Value::List(_, b)) = (self, other) {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = x.sort_cmp(y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            return a.len().cmp(&b.len());
        }
        Ordering::Equal
    }

    /// Returns true if the value can be stored in a column of `col_type`
    pub fn fits(&self, col_type: ScalarType) -> bool {
        match self {
            Value::Null => true,
            Value::List(elem, items) => {
                col_type.element_type() == Some(*elem)
                    && items.iter().all(|v| v.fits(*elem))
            }
            _ => self.scalar_type() == Some(col_type),
        }
    }

    /// Domain of the value after promotion, `None` for null
    pub fn domain(&self) -> Option<Domain> {
        self.scalar_type().map(|t| t.domain())
    }
}

/// Types that can be read out of a [`Value`]
pub trait FromValue: Sized {
    const TYPE_NAME: &'static str;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($t:ty, $name:expr, $($variant:ident),+) => {
        impl FromValue for $t {
            const TYPE_NAME: &'static str = $name;
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    $(Value::$variant(v) => Some(*v),)+
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(bool, "bool", Bool);
impl_from_value!(i8, "i8", Int8, Char);
impl_from_value!(i16, "i16", Int16);
impl_from_value!(i32, "i32", Int32);
impl_from_value!(i64, "i64", Int64);
impl_from_value!(u8, "u8", UInt8, UChar);
impl_from_value!(u16, "u16", UInt16);
impl_from_value!(u32, "u32", UInt32);
impl_from_value!(u64, "u64", UInt64);
impl_from_value!(f32, "f32", Float);
impl_from_value!(f64, "f64", Double);

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        assert_eq!(Value::Int32(7).get::<i32>().unwrap(), 7);
        assert_eq!(Value::Char(65).get::<i8>().unwrap(), 65);
        assert_eq!(Value::Str("x".into()).get::<String>().unwrap(), "x");
    }

    #[test]
    fn test_typed_get_mismatch() {
        let err = Value::Int32(7).get::<i64>().unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::ValueTypeMismatch);
    }

    #[test]
    fn test_promotion() {
        assert_eq!(Value::Int16(-3).as_i64(), Some(-3));
        assert_eq!(Value::UInt32(9).as_u64(), Some(9));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::UInt8(1).as_i64(), None);
    }

    #[test]
    fn test_key_string() {
        assert_eq!(Value::Int64(34).key_string(), "34");
        assert_eq!(Value::Bool(true).key_string(), "true");
        assert_eq!(Value::Date("2019-01-01".into()).key_string(), "2019-01-01");
        assert_eq!(Value::Null.group_key(), None);
        assert_ne!(Value::Null.group_key(), Value::Str(String::new()).group_key());
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        assert_eq!(Value::Null.sort_cmp(&Value::Int32(1)), Ordering::Less);
        assert_eq!(Value::Int32(2).sort_cmp(&Value::Int32(1)), Ordering::Greater);
        assert_eq!(
            Value::Str("a".into()).sort_cmp(&Value::Str("b".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_fits_list() {
        let v = Value::List(ScalarType::Int32, vec![Value::Int32(1), Value::Int32(2)]);
        assert!(v.fits(ScalarType::JaggedInt32));
        assert!(!v.fits(ScalarType::JaggedInt64));
        assert_eq!(v.scalar_type(), Some(ScalarType::JaggedInt32));
    }
}
