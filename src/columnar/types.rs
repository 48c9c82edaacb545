//! Scalar type to Arrow mapping, cell reads and array builds

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, BooleanBuilder, Float32Array, Float64Array,
    Int16Array, Int32Array, Int64Array, Int8Array, ListArray, ListBuilder, StringArray,
    UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{ScalarType, Value};

/// Arrow type of a column
pub fn arrow_type(col_type: ScalarType) -> DataType {
    match col_type {
        ScalarType::Bool => DataType::Boolean,
        ScalarType::Int8 | ScalarType::Char => DataType::Int8,
        ScalarType::Int16 => DataType::Int16,
        ScalarType::Int32 => DataType::Int32,
        ScalarType::Int64 => DataType::Int64,
        ScalarType::UInt8 | ScalarType::UChar => DataType::UInt8,
        ScalarType::UInt16 => DataType::UInt16,
        ScalarType::UInt32 => DataType::UInt32,
        ScalarType::UInt64 => DataType::UInt64,
        ScalarType::Float => DataType::Float32,
        ScalarType::Double => DataType::Float64,
        ScalarType::Date | ScalarType::String => DataType::Utf8,
        jagged => {
            // element_type is always Some for the remaining variants
            let inner = jagged.element_type().unwrap_or(ScalarType::Int64);
            DataType::List(Arc::new(Field::new("item", arrow_type(inner), true)))
        }
    }
}

fn mismatch(col_type: ScalarType, what: impl std::fmt::Debug) -> QueryError {
    QueryError::new(
        QueryErrorCode::ValueTypeMismatch,
        format!("{:?} does not match column type {}", what, col_type),
    )
}

macro_rules! read_primitive {
    ($array:expr, $row:expr, $col_type:expr, $arrow_ty:ty, $variant:ident) => {
        $array
            .as_primitive_opt::<$arrow_ty>()
            .map(|a| Value::$variant(a.value($row)))
            .ok_or_else(|| mismatch($col_type, $array.data_type()))
    };
}

/// Read one cell as a tagged value, honoring the null marker
pub fn array_value(array: &dyn Array, row: usize, col_type: ScalarType) -> QueryResult<Value> {
    if row >= array.len() {
        return Err(QueryError::new(
            QueryErrorCode::RowIndexOOB,
            format!("cell {} beyond chunk of {} rows", row, array.len()),
        ));
    }
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match col_type {
        ScalarType::Bool => array
            .as_boolean_opt()
            .map(|a| Value::Bool(a.value(row)))
            .ok_or_else(|| mismatch(col_type, array.data_type())),
        ScalarType::Int8 => read_primitive!(array, row, col_type, Int8Type, Int8),
        ScalarType::Char => read_primitive!(array, row, col_type, Int8Type, Char),
        ScalarType::Int16 => read_primitive!(array, row, col_type, Int16Type, Int16),
        ScalarType::Int32 => read_primitive!(array, row, col_type, Int32Type, Int32),
        ScalarType::Int64 => read_primitive!(array, row, col_type, Int64Type, Int64),
        ScalarType::UInt8 => read_primitive!(array, row, col_type, UInt8Type, UInt8),
        ScalarType::UChar => read_primitive!(array, row, col_type, UInt8Type, UChar),
        ScalarType::UInt16 => read_primitive!(array, row, col_type, UInt16Type, UInt16),
        ScalarType::UInt32 => read_primitive!(array, row, col_type, UInt32Type, UInt32),
        ScalarType::UInt64 => read_primitive!(array, row, col_type, UInt64Type, UInt64),
        ScalarType::Float => read_primitive!(array, row, col_type, Float32Type, Float),
        ScalarType::Double => read_primitive!(array, row, col_type, Float64Type, Double),
        ScalarType::Date => array
            .as_string_opt::<i32>()
            .map(|a| Value::Date(a.value(row).to_string()))
            .ok_or_else(|| mismatch(col_type, array.data_type())),
        ScalarType::String => array
            .as_string_opt::<i32>()
            .map(|a| Value::Str(a.value(row).to_string()))
            .ok_or_else(|| mismatch(col_type, array.data_type())),
        jagged => {
            let elem = jagged
                .element_type()
                .ok_or_else(|| mismatch(col_type, array.data_type()))?;
            let list = array
                .as_list_opt::<i32>()
                .ok_or_else(|| mismatch(col_type, array.data_type()))?;
            let inner = list.value(row);
            let items = (0..inner.len())
                .map(|i| array_value(inner.as_ref(), i, elem))
                .collect::<QueryResult<Vec<_>>>()?;
            Ok(Value::List(elem, items))
        }
    }
}

macro_rules! build_primitive {
    ($values:expr, $col_type:expr, $array:ty, $($variant:ident)|+) => {{
        let array = $values
            .iter()
            .map(|v| match v {
                $(Value::$variant(x) => Ok(Some(*x)),)+
                Value::Null => Ok(None),
                other => Err(mismatch($col_type, other)),
            })
            .collect::<QueryResult<$array>>()?;
        Arc::new(array) as ArrayRef
    }};
}

macro_rules! build_list {
    ($values:expr, $col_type:expr, $arrow_ty:ty, $($variant:ident)|+) => {{
        let rows = $values
            .iter()
            .map(|v| match v {
                Value::List(_, items) => items
                    .iter()
                    .map(|item| match item {
                        $(Value::$variant(x) => Ok(Some(*x)),)+
                        Value::Null => Ok(None),
                        other => Err(mismatch($col_type, other)),
                    })
                    .collect::<QueryResult<Vec<_>>>()
                    .map(Some),
                Value::Null => Ok(None),
                other => Err(mismatch($col_type, other)),
            })
            .collect::<QueryResult<Vec<_>>>()?;
        Arc::new(ListArray::from_iter_primitive::<$arrow_ty, _, _>(rows)) as ArrayRef
    }};
}

/// Build one array of `col_type` from cell values
pub fn build_array(col_type: ScalarType, values: &[Value]) -> QueryResult<ArrayRef> {
    let array = match col_type {
        ScalarType::Bool => build_primitive!(values, col_type, BooleanArray, Bool),
        ScalarType::Int8 | ScalarType::Char => {
            build_primitive!(values, col_type, Int8Array, Int8 | Char)
        }
        ScalarType::Int16 => build_primitive!(values, col_type, Int16Array, Int16),
        ScalarType::Int32 => build_primitive!(values, col_type, Int32Array, Int32),
        ScalarType::Int64 => build_primitive!(values, col_type, Int64Array, Int64),
        ScalarType::UInt8 | ScalarType::UChar => {
            build_primitive!(values, col_type, UInt8Array, UInt8 | UChar)
        }
        ScalarType::UInt16 => build_primitive!(values, col_type, UInt16Array, UInt16),
        ScalarType::UInt32 => build_primitive!(values, col_type, UInt32Array, UInt32),
        ScalarType::UInt64 => build_primitive!(values, col_type, UInt64Array, UInt64),
        ScalarType::Float => build_primitive!(values, col_type, Float32Array, Float),
        ScalarType::Double => build_primitive!(values, col_type, Float64Array, Double),
        ScalarType::Date | ScalarType::String => {
            let array = values
                .iter()
                .map(|v| match v {
                    Value::Date(s) | Value::Str(s) => Ok(Some(s.as_str())),
                    Value::Null => Ok(None),
                    other => Err(mismatch(col_type, other)),
                })
                .collect::<QueryResult<StringArray>>()?;
            Arc::new(array) as ArrayRef
        }
        ScalarType::JaggedBool => {
            let mut builder = ListBuilder::new(BooleanBuilder::new());
            for v in values {
                match v {
                    Value::List(_, items) => {
                        for item in items {
                            match item {
                                Value::Bool(b) => builder.values().append_value(*b),
                                Value::Null => builder.values().append_null(),
                                other => return Err(mismatch(col_type, other)),
                            }
                        }
                        builder.append(true);
                    }
                    Value::Null => builder.append(false),
                    other => return Err(mismatch(col_type, other)),
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }
        ScalarType::JaggedChar | ScalarType::JaggedInt8 => {
            build_list!(values, col_type, Int8Type, Int8 | Char)
        }
        ScalarType::JaggedUChar | ScalarType::JaggedUInt8 => {
            build_list!(values, col_type, UInt8Type, UInt8 | UChar)
        }
        ScalarType::JaggedInt16 => build_list!(values, col_type, Int16Type, Int16),
        ScalarType::JaggedInt32 => build_list!(values, col_type, Int32Type, Int32),
        ScalarType::JaggedInt64 => build_list!(values, col_type, Int64Type, Int64),
        ScalarType::JaggedUInt16 => build_list!(values, col_type, UInt16Type, UInt16),
        ScalarType::JaggedUInt32 => build_list!(values, col_type, UInt32Type, UInt32),
        ScalarType::JaggedUInt64 => build_list!(values, col_type, UInt64Type, UInt64),
        ScalarType::JaggedFloat => build_list!(values, col_type, Float32Type, Float),
        ScalarType::JaggedDouble => build_list!(values, col_type, Float64Type, Double),
    };
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        assert_eq!(arrow_type(ScalarType::Char), DataType::Int8);
        assert_eq!(arrow_type(ScalarType::UChar), DataType::UInt8);
        assert_eq!(arrow_type(ScalarType::Date), DataType::Utf8);
        assert_eq!(arrow_type(ScalarType::Float), DataType::Float32);
        assert_eq!(
            arrow_type(ScalarType::JaggedUInt32),
            DataType::List(Arc::new(Field::new("item", DataType::UInt32, true)))
        );
    }

    #[test]
    fn test_build_and_read_back() {
        let values = vec![Value::Int16(3), Value::Null, Value::Int16(-7)];
        let array = build_array(ScalarType::Int16, &values).unwrap();
        assert_eq!(array.len(), 3);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&array_value(array.as_ref(), i, ScalarType::Int16).unwrap(), v);
        }
    }

    #[test]
    fn test_char_round_trip() {
        let values = vec![Value::Char(b'Q' as i8), Value::Char(b'V' as i8)];
        let array = build_array(ScalarType::Char, &values).unwrap();
        assert_eq!(array.data_type(), &DataType::Int8);
        assert_eq!(array_value(array.as_ref(), 1, ScalarType::Char).unwrap(), values[1]);
    }

    #[test]
    fn test_jagged_round_trip() {
        let values = vec![
            Value::List(ScalarType::Double, vec![Value::Double(1.0), Value::Double(2.5)]),
            Value::Null,
            Value::List(ScalarType::Double, vec![]),
        ];
        let array = build_array(ScalarType::JaggedDouble, &values).unwrap();
        assert_eq!(array.data_type(), &arrow_type(ScalarType::JaggedDouble));
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&array_value(array.as_ref(), i, ScalarType::JaggedDouble).unwrap(), v);
        }
    }

    #[test]
    fn test_jagged_bool_round_trip() {
        let values = vec![Value::List(ScalarType::Bool, vec![Value::Bool(true), Value::Null])];
        let array = build_array(ScalarType::JaggedBool, &values).unwrap();
        assert_eq!(array.data_type(), &arrow_type(ScalarType::JaggedBool));
        assert_eq!(array_value(array.as_ref(), 0, ScalarType::JaggedBool).unwrap(), values[0]);
    }

    #[test]
    fn test_build_rejects_wrong_variant() {
        let err = build_array(ScalarType::Int32, &[Value::Int64(1)]).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::ValueTypeMismatch);
    }

    #[test]
    fn test_read_rejects_wrong_array() {
        let array = build_array(ScalarType::Int32, &[Value::Int32(1)]).unwrap();
        assert!(array_value(array.as_ref(), 0, ScalarType::Int64).is_err());
        assert!(array_value(array.as_ref(), 5, ScalarType::Int32).is_err());
    }
}
