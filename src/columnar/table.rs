//! Columnar table and its IPC stream codec
//!
//! A table is an Arrow schema (carrying the metadata side table) plus an
//! ordered list of record batches. Each batch is one chunk; all columns
//! share the chunk boundaries.
//!
//! Column layout:
//!
//! ```text
//! | data col 0 | ... | data col n-1 | RID (Int64) | DELETED_VECTOR (Boolean) |
//! ```

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Field, Int64Type, Schema as ArrowSchema, SchemaRef};
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;

use super::metadata::{meta_from_map, meta_to_map};
use super::types::arrow_type;
use crate::errors::{QueryError, QueryResult};
use crate::schema::{Schema, DELETED_VECTOR_COL_NAME, RID_COL_NAME};
use crate::storage::{FormatError, FormatResult, TableMeta};

/// Chunked columnar table
#[derive(Debug, Clone)]
pub struct ColumnarTable {
    schema: SchemaRef,
    chunks: Vec<RecordBatch>,
}

/// Column index of the row-id column for `num_cols` data columns
pub fn rid_index(num_cols: usize) -> usize {
    num_cols
}

/// Column index of the delete-flag column for `num_cols` data columns
pub fn delvec_index(num_cols: usize) -> usize {
    num_cols + 1
}

/// Arrow schema for a data schema, with the two trailing columns and `meta`
pub fn arrow_schema(schema: &Schema, meta: &TableMeta) -> SchemaRef {
    let mut fields: Vec<Field> = schema
        .iter()
        .map(|c| Field::new(c.name.clone(), arrow_type(c.col_type), true))
        .collect();
    fields.push(Field::new(RID_COL_NAME, DataType::Int64, false));
    fields.push(Field::new(DELETED_VECTOR_COL_NAME, DataType::Boolean, false));
    Arc::new(ArrowSchema::new_with_metadata(fields, meta_to_map(meta)))
}

impl ColumnarTable {
    /// Assemble a table from chunks that all match `schema`
    pub fn try_new(schema: SchemaRef, chunks: Vec<RecordBatch>) -> QueryResult<Self> {
        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.schema().fields() != schema.fields() {
                return Err(QueryError::arrow_status(format!(
                    "chunk {} does not match table schema",
                    i
                )));
            }
        }
        Ok(Self { schema, chunks })
    }

    /// Build a single-chunk table from whole columns
    pub fn from_columns(schema: SchemaRef, columns: Vec<ArrayRef>) -> QueryResult<Self> {
        let batch = RecordBatch::try_new(schema.clone(), columns)
            .map_err(|e| QueryError::arrow_status(e.to_string()))?;
        Self::try_new(schema, vec![batch])
    }

    /// Same columns and chunks under new metadata
    pub fn with_meta(&self, meta: &TableMeta) -> QueryResult<Self> {
        let schema = Arc::new(ArrowSchema::new_with_metadata(
            self.schema.fields().clone(),
            meta_to_map(meta),
        ));
        let chunks = self
            .chunks
            .iter()
            .map(|c| rewrap(&schema, c))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self { schema, chunks })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn chunks(&self) -> &[RecordBatch] {
        &self.chunks
    }

    /// Metadata side table
    pub fn meta(&self) -> QueryResult<TableMeta> {
        meta_from_map(self.schema.metadata())
    }

    /// Data schema parsed from the metadata
    pub fn data_schema(&self) -> QueryResult<Schema> {
        self.meta()?.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.chunks.iter().map(|c| c.num_rows()).sum()
    }

    /// Total columns, trailing columns included
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Number of data columns
    pub fn num_data_columns(&self) -> usize {
        self.num_columns().saturating_sub(2)
    }

    pub fn chunk_lengths(&self) -> Vec<usize> {
        self.chunks.iter().map(|c| c.num_rows()).collect()
    }

    /// Row id at a chunk position
    pub fn rid_at(&self, chunk: usize, offset: usize) -> QueryResult<i64> {
        let col = self.column(chunk, rid_index(self.num_data_columns()))?;
        col.as_primitive_opt::<Int64Type>()
            .filter(|a| offset < a.len())
            .map(|a| a.value(offset))
            .ok_or_else(|| QueryError::arrow_status("RID column is not Int64"))
    }

    /// Delete flag at a chunk position
    pub fn is_deleted_at(&self, chunk: usize, offset: usize) -> QueryResult<bool> {
        let col = self.column(chunk, delvec_index(self.num_data_columns()))?;
        col.as_boolean_opt()
            .filter(|a| offset < a.len())
            .map(|a| a.is_valid(offset) && a.value(offset))
            .ok_or_else(|| QueryError::arrow_status("DELETED_VECTOR column is not Boolean"))
    }

    /// One column of one chunk
    pub fn column(&self, chunk: usize, col: usize) -> QueryResult<&ArrayRef> {
        let batch = self
            .chunks
            .get(chunk)
            .ok_or_else(|| QueryError::arrow_status(format!("chunk {} out of range", chunk)))?;
        if col >= batch.num_columns() {
            return Err(QueryError::arrow_status(format!(
                "column {} out of range ({} columns)",
                col,
                batch.num_columns()
            )));
        }
        Ok(batch.column(col))
    }

    /// Encode as an IPC stream, one message per chunk
    pub fn encode(&self) -> FormatResult<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut writer = StreamWriter::try_new(&mut buffer, &self.schema)?;
            for chunk in &self.chunks {
                writer.write(chunk)?;
            }
            writer.finish()?;
        }
        Ok(buffer)
    }

    /// Decode an IPC stream
    pub fn decode(data: &[u8]) -> FormatResult<Self> {
        let reader = StreamReader::try_new(Cursor::new(data), None)?;
        let schema = reader.schema();
        let chunks = reader.collect::<Result<Vec<_>, _>>()?;
        if schema.fields().len() < 2 {
            return Err(FormatError::corrupt("columnar table lacks RID and DELETED_VECTOR"));
        }
        Ok(Self { schema, chunks })
    }
}

/// Re-attach a chunk's columns to `schema`
pub(crate) fn rewrap(schema: &SchemaRef, chunk: &RecordBatch) -> QueryResult<RecordBatch> {
    RecordBatch::try_new(schema.clone(), chunk.columns().to_vec())
        .map_err(|e| QueryError::arrow_status(e.to_string()))
}
