//! Result types for query execution

use crate::errors::QueryError;
use crate::schema::{Schema, Value};

/// One output row: row id and one value per output column
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    /// Source row id, -1 for synthesized aggregate rows
    pub rid: i64,
    pub values: Vec<Value>,
}

impl OutputRow {
    pub fn new(rid: i64, values: Vec<Value>) -> Self {
        Self { rid, values }
    }
}

/// Rows chosen by a query, before encoding
#[derive(Debug)]
pub struct Selection {
    /// Output schema, indices `0..n`
    pub schema: Schema,
    pub rows: Vec<OutputRow>,
    /// Degraded-path errors; the rows are still complete
    pub warnings: Vec<QueryError>,
    /// Candidate rows examined
    pub scanned_count: usize,
}

/// Encoded result of one query
#[derive(Debug)]
pub struct ExecutionResult {
    pub output_bytes: Vec<u8>,
    pub warnings: Vec<QueryError>,
    pub scanned_count: usize,
    pub returned_count: usize,
}

impl ExecutionResult {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
