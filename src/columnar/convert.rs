//! Row table <-> columnar table conversion
//!
//! Metadata travels as the schema side table in columnar form and as the
//! container header in row form. Row ids and delete flags become the two
//! trailing columns.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array};

use super::table::{arrow_schema, ColumnarTable};
use super::types::{array_value, build_array};
use crate::errors::QueryResult;
use crate::schema::{Schema, Value};
use crate::storage::{DataFormat, Record, RowTable};

/// Convert a row table into a single-chunk columnar table.
///
/// With a projection the output holds only those columns. Column indices
/// of the output schema always run 0..n.
pub fn to_columnar(table: &RowTable, projection: Option<&Schema>) -> QueryResult<ColumnarTable> {
    let data_schema = table.schema()?;
    let source = projection.unwrap_or(&data_schema);
    let out_schema = source.reindexed();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(source.len() + 2);
    for col in source {
        let cells = table
            .rows
            .iter()
            .map(|rec| rec.cell(col))
            .collect::<QueryResult<Vec<_>>>()?;
        columns.push(build_array(col.col_type, &cells)?);
    }

    let rids: Int64Array = table.rows.iter().map(|r| r.rid).collect();
    let deleted: BooleanArray = (0..table.nrows())
        .map(|rnum| Some(table.is_deleted(rnum)))
        .collect();
    columns.push(Arc::new(rids));
    columns.push(Arc::new(deleted));

    let mut meta = table.meta.derive(&out_schema, table.nrows() as u64);
    meta.data_format_type = DataFormat::Columnar.code();
    ColumnarTable::from_columns(arrow_schema(&out_schema, &meta), columns)
}

/// Convert a columnar table back into row form.
///
/// Each cell lands at its column's index in the record's value vector.
pub fn to_row(table: &ColumnarTable) -> QueryResult<RowTable> {
    let schema = table.data_schema()?;
    let width = usize::try_from(schema.max_idx() + 1).unwrap_or(0);

    let mut meta = table.meta()?;
    meta.data_format_type = DataFormat::RowFlex.code();
    let mut out = RowTable::with_meta(meta);

    for (chunk_idx, chunk) in table.chunks().iter().enumerate() {
        for offset in 0..chunk.num_rows() {
            let mut values = vec![Value::Null; width];
            for (pos, col) in schema.iter().enumerate() {
                let array = table.column(chunk_idx, pos)?;
                if let Ok(slot) = usize::try_from(col.idx) {
                    values[slot] = array_value(array.as_ref(), offset, col.col_type)?;
                }
            }
            let rid = table.rid_at(chunk_idx, offset)?;
            let deleted = table.is_deleted_at(chunk_idx, offset)?;
            out.push_with_flag(Record::new(rid, values), deleted);
        }
    }
    Ok(out)
}
