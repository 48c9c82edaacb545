//! Cell access over both table layouts
//!
//! The executor addresses rows by their position in the table (row number)
//! and columns by descriptor, so grouping, sorting and materialization run
//! unchanged over row and columnar storage.

use std::collections::HashMap;

use crate::columnar::{array_value, locate, ColumnarTable};
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{ColInfo, Schema, Value};
use crate::storage::RowTable;

/// Read access to one input table
pub trait CellSource {
    /// Rows in the table, deleted ones included
    fn num_rows(&self) -> usize;

    fn is_deleted(&self, row: usize) -> QueryResult<bool>;

    fn rid(&self, row: usize) -> QueryResult<i64>;

    /// Cell of `col` in row `row`; the row-id descriptor reads the rid
    fn cell(&self, row: usize, col: &ColInfo) -> QueryResult<Value>;
}

fn row_oob(row: usize, nrows: usize) -> QueryError {
    QueryError::row_index_oob(row as u64, nrows as u64)
}

impl CellSource for RowTable {
    fn num_rows(&self) -> usize {
        self.nrows()
    }

    fn is_deleted(&self, row: usize) -> QueryResult<bool> {
        Ok(RowTable::is_deleted(self, row))
    }

    fn rid(&self, row: usize) -> QueryResult<i64> {
        self.rows
            .get(row)
            .map(|r| r.rid)
            .ok_or_else(|| row_oob(row, self.nrows()))
    }

    fn cell(&self, row: usize, col: &ColInfo) -> QueryResult<Value> {
        self.rows
            .get(row)
            .ok_or_else(|| row_oob(row, self.nrows()))?
            .cell(col)
    }
}

/// Columnar table with row numbers resolved through chunk lengths
pub struct ColumnarSource<'a> {
    table: &'a ColumnarTable,
    lengths: Vec<usize>,
    /// Column index to field position
    positions: HashMap<i32, usize>,
}

impl<'a> ColumnarSource<'a> {
    /// `schema` describes the table's data columns, in field order
    pub fn new(table: &'a ColumnarTable, schema: &Schema) -> Self {
        let positions = schema
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.idx, pos))
            .collect();
        Self {
            table,
            lengths: table.chunk_lengths(),
            positions,
        }
    }

    /// Field position of a column index
    pub fn position(&self, idx: i32) -> Option<usize> {
        self.positions.get(&idx).copied()
    }

    fn locate(&self, row: usize) -> QueryResult<(usize, usize)> {
        locate(&self.lengths, row).ok_or_else(|| row_oob(row, self.num_rows()))
    }
}

impl CellSource for ColumnarSource<'_> {
    fn num_rows(&self) -> usize {
        self.lengths.iter().sum()
    }

    fn is_deleted(&self, row: usize) -> QueryResult<bool> {
        let (chunk, offset) = self.locate(row)?;
        self.table.is_deleted_at(chunk, offset)
    }

    fn rid(&self, row: usize) -> QueryResult<i64> {
        let (chunk, offset) = self.locate(row)?;
        self.table.rid_at(chunk, offset)
    }

    fn cell(&self, row: usize, col: &ColInfo) -> QueryResult<Value> {
        if col.is_rid() {
            return Ok(Value::UInt64(self.rid(row)? as u64));
        }
        let pos = self.position(col.idx).ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::RequestedColIndexOOB,
                format!("rid={} col.idx={} OOB.", self.rid(row).unwrap_or(-1), col.idx),
            )
        })?;
        let (chunk, offset) = self.locate(row)?;
        let array = self.table.column(chunk, pos)?;
        array_value(array.as_ref(), offset, col.col_type)
    }
}
