//! JSON input tables
//!
//! ```json
//! {"schema": "0 4 1 0 ID;1 15 0 1 NAME",
//!  "db_schema": "tpch", "table_name": "people",
//!  "rows": [[1, "ann"], [2, null]],
//!  "deleted": [0, 1]}
//! ```
//!
//! Rows are positional and follow the schema's column order. Row ids are
//! the row positions.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::errors::{FormatError, FormatResult};
use super::record::Record;
use super::table::RowTable;
use crate::schema::{ColInfo, ScalarType, Schema, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTable {
    pub schema: String,
    #[serde(default)]
    pub db_schema: String,
    #[serde(default)]
    pub table_name: String,
    pub rows: Vec<Vec<JsonValue>>,
    #[serde(default)]
    pub deleted: Vec<u8>,
}

impl JsonTable {
    pub fn from_slice(data: &[u8]) -> FormatResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Convert into a row table, typing every cell by its column
    pub fn into_row_table(self) -> FormatResult<RowTable> {
        let schema = Schema::parse(&self.schema).map_err(|e| FormatError::corrupt(e.to_string()))?;
        let mut table = RowTable::new(&schema, &self.db_schema, &self.table_name);

        for (rnum, cells) in self.rows.iter().enumerate() {
            if cells.len() != schema.len() {
                return Err(FormatError::corrupt(format!(
                    "row {} has {} cells, schema has {} columns",
                    rnum,
                    cells.len(),
                    schema.len()
                )));
            }
            let values = schema
                .iter()
                .zip(cells)
                .map(|(col, cell)| json_to_value(col, cell))
                .collect::<FormatResult<Vec<_>>>()?;
            let deleted = self.deleted.get(rnum).copied() == Some(1);
            table.push_with_flag(Record::new(rnum as i64, values), deleted);
        }
        Ok(table)
    }
}

fn json_to_value(col: &ColInfo, cell: &JsonValue) -> FormatResult<Value> {
    if cell.is_null() {
        return Ok(Value::Null);
    }
    cell_value(col.col_type, cell).ok_or_else(|| {
        FormatError::corrupt(format!(
            "cell {} does not fit column {} ({})",
            cell, col.name, col.col_type
        ))
    })
}

fn cell_value(col_type: ScalarType, cell: &JsonValue) -> Option<Value> {
    if cell.is_null() {
        return Some(Value::Null);
    }
    let value = match col_type {
        ScalarType::Bool => Value::Bool(cell.as_bool()?),
        ScalarType::Int8 => Value::Int8(i8::try_from(cell.as_i64()?).ok()?),
        ScalarType::Int16 => Value::Int16(i16::try_from(cell.as_i64()?).ok()?),
        ScalarType::Int32 => Value::Int32(i32::try_from(cell.as_i64()?).ok()?),
        ScalarType::Int64 => Value::Int64(cell.as_i64()?),
        ScalarType::UInt8 => Value::UInt8(u8::try_from(cell.as_u64()?).ok()?),
        ScalarType::UInt16 => Value::UInt16(u16::try_from(cell.as_u64()?).ok()?),
        ScalarType::UInt32 => Value::UInt32(u32::try_from(cell.as_u64()?).ok()?),
        ScalarType::UInt64 => Value::UInt64(cell.as_u64()?),
        ScalarType::Char => Value::Char(*cell.as_str()?.as_bytes().first()? as i8),
        ScalarType::UChar => Value::UChar(*cell.as_str()?.as_bytes().first()?),
        ScalarType::Float => Value::Float(cell.as_f64()? as f32),
        ScalarType::Double => Value::Double(cell.as_f64()?),
        ScalarType::Date => Value::Date(cell.as_str()?.to_string()),
        ScalarType::String => Value::Str(cell.as_str()?.to_string()),
        jagged => {
            let elem = jagged.element_type()?;
            let items = cell
                .as_array()?
                .iter()
                .map(|c| cell_value(elem, c))
                .collect::<Option<Vec<_>>>()?;
            Value::List(elem, items)
        }
    };
    Some(value)
}
