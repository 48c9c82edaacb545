//! Query executor
//!
//! Takes a [`QueryRequest`] carrying a serialized table and returns a
//! [`QueryResponse`] carrying the result table in the same format family.
//!
//! # Execution Flow (strict order)
//!
//! 1. Decode the input buffer, verifying it
//! 2. Resolve projection, predicates, group-by and order-by
//! 3. Take the explicit rows, or every row
//! 4. Drop tombstoned rows
//! 5. Filter (row-wise for row tables, column-wise for columnar)
//! 6. Group or aggregate, then order
//! 7. Project and encode
//!
//! # Invariants
//!
//! - Deterministic: same request, same bytes out
//! - A row number past the table is fatal and emits no rows
//! - A projected column index past the schema is degraded: the output is
//!   complete, the cell is null and the response carries the error
//! - Output buffers are always complete containers

mod columnar;
mod executor;
mod filters;
mod grouping;
mod plan;
mod request;
mod result;
mod row;
mod sorter;
mod source;
mod stats;

pub use columnar::{empty_columnar_output, process_columnar, process_columnar_bytes};
pub use executor::{execute_query, QueryExecutor};
pub use filters::PredicateFilter;
pub use grouping::{fold_aggregates, group_rows};
pub use plan::{FilterStrategy, QueryPlan};
pub(crate) use request::base64_bytes;
pub use request::{QueryRequest, QueryResponse};
pub use result::{ExecutionResult, OutputRow, Selection};
pub use row::{empty_row_output, process_json, process_row_bytes, process_row_table};
pub use sorter::{parse_order_by, ResultSorter, SortDirection, SortSpec};
pub use source::{CellSource, ColumnarSource};
pub use stats::{
    histogram, process_stats, process_stats_bytes, stats_schema, Bucket, StatsRequest,
    BUCKET_COUNT_COL, BUCKET_MAX_COL, BUCKET_MIN_COL,
};
