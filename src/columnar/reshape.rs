//! Chunk reshaping: flatten, split into shards, combine shards

use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema as ArrowSchema;

use super::metadata::meta_to_map;
use super::table::{rewrap, ColumnarTable};
use crate::errors::{QueryError, QueryResult};
use crate::storage::TableMeta;

/// Collapse every chunk into one
pub fn flatten(table: &ColumnarTable) -> QueryResult<ColumnarTable> {
    let batch = concat_batches(table.schema(), table.chunks())
        .map_err(|e| QueryError::arrow_status(e.to_string()).with_source(e))?;
    ColumnarTable::try_new(table.schema().clone(), vec![batch])
}

/// Split into shards of at most `max_rows` rows.
///
/// The trailing partial shard is kept. Every shard carries the source
/// metadata with NUM_ROWS set to its own row count. An empty table yields
/// one empty shard.
pub fn split(table: &ColumnarTable, max_rows: usize) -> QueryResult<Vec<ColumnarTable>> {
    if max_rows == 0 {
        return Err(QueryError::arrow_status("shard size must be at least one row"));
    }
    let meta = table.meta()?;
    let flat = flatten(table)?;
    let total = flat.num_rows();
    if total == 0 {
        return Ok(vec![flat.with_meta(&TableMeta { nrows: 0, ..meta })?]);
    }

    let batch = &flat.chunks()[0];
    let mut shards = Vec::with_capacity(total.div_ceil(max_rows));
    let mut start = 0;
    while start < total {
        let len = max_rows.min(total - start);
        let shard_meta = TableMeta {
            nrows: len as u64,
            ..meta.clone()
        };
        let shard = ColumnarTable::try_new(flat.schema().clone(), vec![batch.slice(start, len)])?;
        shards.push(shard.with_meta(&shard_meta)?);
        start += len;
    }
    Ok(shards)
}

/// Concatenate shards that share a column layout.
///
/// The result keeps each shard as its own chunk; NUM_ROWS is the sum of
/// the shards' row counts and the remaining metadata comes from the first.
pub fn combine(shards: &[ColumnarTable]) -> QueryResult<ColumnarTable> {
    let first = shards
        .first()
        .ok_or_else(|| QueryError::arrow_status("no shards to combine"))?;
    let mut meta = first.meta()?;
    meta.nrows = 0;

    for (i, shard) in shards.iter().enumerate() {
        if shard.schema().fields() != first.schema().fields() {
            return Err(QueryError::arrow_status(format!(
                "shard {} does not match the first shard's columns",
                i
            )));
        }
        meta.nrows += shard.meta()?.nrows;
    }

    let schema = Arc::new(ArrowSchema::new_with_metadata(
        first.schema().fields().clone(),
        meta_to_map(&meta),
    ));
    let chunks = shards
        .iter()
        .flat_map(|s| s.chunks())
        .map(|c| rewrap(&schema, c))
        .collect::<QueryResult<Vec<_>>>()?;
    ColumnarTable::try_new(schema, chunks)
}
