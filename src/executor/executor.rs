//! Query entry point
//!
//! Execution flow (strict order):
//! 1. Decode the input buffer in its declared format
//! 2. Resolve the request against the table's data schema
//! 3. Select rows (explicit rows, tombstones, predicates)
//! 4. Group, aggregate and order
//! 5. Project and encode in the input's family (JSON in, row table out)
//!
//! A fatal error still yields a complete, empty container.

use std::sync::Arc;

use uuid::Uuid;

use super::columnar::{empty_columnar_output, process_columnar_bytes};
use super::request::{QueryRequest, QueryResponse};
use super::result::ExecutionResult;
use super::row::{empty_row_output, process_json, process_row_bytes};
use crate::errors::QueryResult;
use crate::observability::{Logger, ObservationScope, QueryMetrics};
use crate::storage::DataFormat;

/// Decode, run and encode one request
pub fn execute_query(request: &QueryRequest) -> QueryResult<ExecutionResult> {
    match request.input_format {
        DataFormat::RowFlex => process_row_bytes(request),
        DataFormat::Columnar => process_columnar_bytes(request),
        DataFormat::Json => process_json(request),
    }
}

/// Output container for a request that produced no rows
fn empty_output(format: DataFormat) -> Vec<u8> {
    match format {
        DataFormat::Columnar => or_log_empty(format, empty_columnar_output()),
        DataFormat::RowFlex | DataFormat::Json => empty_row_output(),
    }
}

/// Encoded container, or no bytes after logging the encode failure
fn or_log_empty(format: DataFormat, encoded: QueryResult<Vec<u8>>) -> Vec<u8> {
    encoded.unwrap_or_else(|err| {
        Logger::error(
            "EMPTY_OUTPUT_ENCODE_FAILED",
            &[
                ("format", format.as_str()),
                ("error", err.to_string().as_str()),
            ],
        );
        Vec::new()
    })
}

/// Runs requests and keeps counters across them
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    metrics: Arc<QueryMetrics>,
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor sharing `metrics` with other holders
    pub fn with_metrics(metrics: Arc<QueryMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    /// Execute `request`. Never fails: errors travel in the response.
    pub fn execute(&self, request: &QueryRequest) -> QueryResponse {
        let query_id = Uuid::new_v4().to_string();
        let scope = ObservationScope::with_fields(
            "QUERY",
            &[
                ("query_id", query_id.as_str()),
                ("format", request.input_format.as_str()),
            ],
        );
        self.metrics.increment_queries_executed();

        match execute_query(request) {
            Ok(result) => {
                self.metrics.add_rows_scanned(result.scanned_count as u64);
                self.metrics.add_rows_emitted(result.returned_count as u64);

                let scanned = result.scanned_count.to_string();
                let emitted = result.returned_count.to_string();
                let response =
                    QueryResponse::with_errors(result.output_bytes, &result.warnings);
                let error_code = response.error_code.to_string();
                if result.warnings.is_empty() {
                    scope.complete_with_fields(&[
                        ("rows_scanned", scanned.as_str()),
                        ("rows_emitted", emitted.as_str()),
                    ]);
                } else {
                    Logger::warn(
                        "QUERY_DEGRADED",
                        &[
                            ("query_id", query_id.as_str()),
                            ("warnings", result.warnings.len().to_string().as_str()),
                        ],
                    );
                    scope.complete_with_fields(&[
                        ("rows_scanned", scanned.as_str()),
                        ("rows_emitted", emitted.as_str()),
                        ("error_code", error_code.as_str()),
                    ]);
                }
                response
            }
            Err(err) => {
                self.metrics.increment_queries_failed();
                scope.fail(&err.to_string());
                QueryResponse::with_errors(empty_output(request.input_format), &[err])
            }
        }
    }
}
