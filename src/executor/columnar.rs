//! Query over columnar tables
//!
//! A plain projection of stored columns with no live filtering is served by
//! selecting whole arrays chunk by chunk. Everything else goes through the
//! shared pipeline with column-wise predicate evaluation, and the selected
//! rows are rebuilt into fresh arrays.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array};
use arrow::record_batch::RecordBatch;

use super::plan::{FilterStrategy, QueryPlan};
use super::request::QueryRequest;
use super::result::{ExecutionResult, Selection};
use super::source::ColumnarSource;
use crate::columnar::{arrow_schema, build_array, delvec_index, rid_index, ColumnarTable};
use crate::errors::{QueryError, QueryResult};
use crate::schema::{Schema, Value};
use crate::storage::{DataFormat, TableMeta};

/// Run `request` over a decoded columnar table
pub fn process_columnar(
    table: &ColumnarTable,
    request: &QueryRequest,
) -> QueryResult<ExecutionResult> {
    let stored_schema = table.data_schema()?;
    let plan = QueryPlan::build(request, &stored_schema)?;
    let source = ColumnarSource::new(table, &stored_schema);

    if plan.is_pure_projection() && !has_deleted(table)? {
        if let Some(positions) = direct_positions(&plan, &stored_schema, &source) {
            return project_arrays(table, &plan, &positions);
        }
    }

    let meta = table.meta()?;
    let selection = plan.select(&source, FilterStrategy::ColumnWise, &meta.table_name)?;
    encode_selection(&meta, selection)
}

/// Decode a columnar buffer and run `request` over it
pub fn process_columnar_bytes(request: &QueryRequest) -> QueryResult<ExecutionResult> {
    let table = ColumnarTable::decode(&request.input_bytes)?;
    process_columnar(&table, request)
}

/// Valid, empty columnar table; the body of a failed response
pub fn empty_columnar_output() -> QueryResult<Vec<u8>> {
    let schema = Schema::default();
    let meta = TableMeta::new(DataFormat::Columnar, &schema, "", "");
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(Vec::<i64>::new())),
        Arc::new(BooleanArray::from(Vec::<bool>::new())),
    ];
    let table = ColumnarTable::from_columns(arrow_schema(&schema, &meta), columns)?;
    Ok(table.encode()?)
}

fn has_deleted(table: &ColumnarTable) -> QueryResult<bool> {
    let delvec = delvec_index(table.num_data_columns());
    for chunk in 0..table.chunks().len() {
        let flags = table.column(chunk, delvec)?;
        let flags = flags
            .as_boolean_opt()
            .ok_or_else(|| QueryError::arrow_status("DELETED_VECTOR column is not Boolean"))?;
        if flags.true_count() > 0 {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Field positions of the projected columns, when every one is a stored
/// column of the same type
fn direct_positions(
    plan: &QueryPlan,
    stored_schema: &Schema,
    source: &ColumnarSource<'_>,
) -> Option<Vec<usize>> {
    plan.projection
        .iter()
        .map(|col| {
            if col.is_rid() {
                return None;
            }
            let stored = stored_schema.by_idx(col.idx)?;
            if stored.col_type != col.col_type {
                return None;
            }
            source.position(col.idx)
        })
        .collect()
}

/// Select whole arrays per chunk. Every projected array of a chunk must
/// have the same length.
fn project_arrays(
    table: &ColumnarTable,
    plan: &QueryPlan,
    positions: &[usize],
) -> QueryResult<ExecutionResult> {
    let out_schema = plan.output_schema()?;
    let nrows = table.num_rows();
    let mut meta = table.meta()?.derive(&out_schema, nrows as u64);
    meta.data_format_type = DataFormat::Columnar.code();
    let schema = arrow_schema(&out_schema, &meta);

    let ndata = table.num_data_columns();
    let mut batches = Vec::with_capacity(table.chunks().len());
    for chunk in 0..table.chunks().len() {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(positions.len() + 2);
        for &pos in positions {
            columns.push(table.column(chunk, pos)?.clone());
        }
        columns.push(table.column(chunk, rid_index(ndata))?.clone());
        columns.push(table.column(chunk, delvec_index(ndata))?.clone());

        if let Some(first) = columns.first() {
            let len = first.len();
            if columns.iter().any(|c| c.len() != len) {
                return Err(QueryError::arrow_status(
                    "input table columns length not the same",
                ));
            }
        }
        let batch = RecordBatch::try_new(schema.clone(), columns)
            .map_err(|e| QueryError::arrow_status(e.to_string()))?;
        batches.push(batch);
    }

    let output = ColumnarTable::try_new(schema, batches)?;
    Ok(ExecutionResult {
        output_bytes: output.encode()?,
        warnings: Vec::new(),
        scanned_count: nrows,
        returned_count: nrows,
    })
}

fn encode_selection(source_meta: &TableMeta, selection: Selection) -> QueryResult<ExecutionResult> {
    let nrows = selection.rows.len();
    let mut meta = source_meta.derive(&selection.schema, nrows as u64);
    meta.data_format_type = DataFormat::Columnar.code();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(selection.schema.len() + 2);
    for (pos, col) in selection.schema.iter().enumerate() {
        let cells: Vec<_> = selection
            .rows
            .iter()
            .map(|r| r.values.get(pos).cloned().unwrap_or(Value::Null))
            .collect();
        columns.push(build_array(col.col_type, &cells)?);
    }
    let rids: Int64Array = selection.rows.iter().map(|r| Some(r.rid)).collect();
    columns.push(Arc::new(rids));
    columns.push(Arc::new(BooleanArray::from(vec![false; nrows])));

    let output = ColumnarTable::from_columns(arrow_schema(&selection.schema, &meta), columns)?;
    Ok(ExecutionResult {
        output_bytes: output.encode()?,
        warnings: selection.warnings,
        scanned_count: selection.scanned_count,
        returned_count: nrows,
    })
}
