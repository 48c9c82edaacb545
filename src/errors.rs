//! Query error types
//!
//! Every failure inside a query call is reported as a [`QueryError`]. The
//! numeric form of the code travels back to the host in the response, the
//! string form is used in logs.
//!
//! Error codes:
//! - SKY_BAD_COL_INFO_FORMAT (ERROR)
//! - SKY_REQUESTED_COL_NOT_PRESENT (ERROR)
//! - SKY_OP_NOT_RECOGNIZED (ERROR)
//! - SKY_BAD_PREDICATE_LITERAL (ERROR)
//! - SKY_PREDICATE_COMPARISON_NOT_DEFINED (ERROR)
//! - SKY_UNSUPPORTED_SKY_DATA_TYPE (ERROR)
//! - SKY_UNSUPPORTED_AGG_DATA_TYPE (ERROR)
//! - SKY_BAD_ORDER_BY (ERROR)
//! - SKY_ROW_INDEX_OOB (FATAL)
//! - SKY_REQUESTED_COL_INDEX_OOB (ERROR)
//! - SKY_VALUE_TYPE_MISMATCH (ERROR)
//! - SKY_ARROW_STATUS_ERR (FATAL)
//! - SKY_DATA_CORRUPTION (FATAL)
//! - SKY_UNSUPPORTED_FORMAT (ERROR)

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call failed, the input may be retried with a corrected request
    Error,
    /// The call aborted on inconsistent or corrupt input
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorCode {
    /// Schema segment is not `idx type is_key nullable name`
    BadColInfoFormat,
    /// A referenced column name is absent from the schema
    RequestedColNotPresent,
    /// Operator string is not in the operator table
    OpNotRecognized,
    /// Predicate literal cannot be parsed for the column type
    BadPredicateLiteral,
    /// Operator has no meaning for the compared domain
    PredicateComparisonNotDefined,
    /// Column type cannot be handled by this code path
    UnsupportedSkyDataType,
    /// Aggregate requested over a type that cannot be aggregated
    UnsupportedAggDataType,
    /// Malformed order-by item or direction
    BadOrderBy,
    /// Requested row number is outside the table
    RowIndexOOB,
    /// Projected column index is outside the data schema
    RequestedColIndexOOB,
    /// A stored value does not have the requested type
    ValueTypeMismatch,
    /// Columnar container is inconsistent or could not be built
    ArrowStatusErr,
    /// Input bytes failed validation
    DataCorruption,
    /// Input format tag is not handled
    UnsupportedFormat,
    /// Histogram bucket count, range or sampling rate is unusable
    BadStatsArgument,
}

impl QueryErrorCode {
    /// Returns the string code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::BadColInfoFormat => "SKY_BAD_COL_INFO_FORMAT",
            QueryErrorCode::RequestedColNotPresent => "SKY_REQUESTED_COL_NOT_PRESENT",
            QueryErrorCode::OpNotRecognized => "SKY_OP_NOT_RECOGNIZED",
            QueryErrorCode::BadPredicateLiteral => "SKY_BAD_PREDICATE_LITERAL",
            QueryErrorCode::PredicateComparisonNotDefined => {
                "SKY_PREDICATE_COMPARISON_NOT_DEFINED"
            }
            QueryErrorCode::UnsupportedSkyDataType => "SKY_UNSUPPORTED_SKY_DATA_TYPE",
            QueryErrorCode::UnsupportedAggDataType => "SKY_UNSUPPORTED_AGG_DATA_TYPE",
            QueryErrorCode::BadOrderBy => "SKY_BAD_ORDER_BY",
            QueryErrorCode::RowIndexOOB => "SKY_ROW_INDEX_OOB",
            QueryErrorCode::RequestedColIndexOOB => "SKY_REQUESTED_COL_INDEX_OOB",
            QueryErrorCode::ValueTypeMismatch => "SKY_VALUE_TYPE_MISMATCH",
            QueryErrorCode::ArrowStatusErr => "SKY_ARROW_STATUS_ERR",
            QueryErrorCode::DataCorruption => "SKY_DATA_CORRUPTION",
            QueryErrorCode::UnsupportedFormat => "SKY_UNSUPPORTED_FORMAT",
            QueryErrorCode::BadStatsArgument => "SKY_BAD_STATS_ARGUMENT",
        }
    }

    /// Returns the numeric code reported in a query response.
    ///
    /// Zero is reserved for success.
    pub fn number(&self) -> i32 {
        match self {
            QueryErrorCode::BadColInfoFormat => 1,
            QueryErrorCode::RequestedColNotPresent => 2,
            QueryErrorCode::OpNotRecognized => 3,
            QueryErrorCode::BadPredicateLiteral => 4,
            QueryErrorCode::PredicateComparisonNotDefined => 5,
            QueryErrorCode::UnsupportedSkyDataType => 6,
            QueryErrorCode::UnsupportedAggDataType => 7,
            QueryErrorCode::BadOrderBy => 8,
            QueryErrorCode::RowIndexOOB => 9,
            QueryErrorCode::RequestedColIndexOOB => 10,
            QueryErrorCode::ValueTypeMismatch => 11,
            QueryErrorCode::ArrowStatusErr => 12,
            QueryErrorCode::DataCorruption => 13,
            QueryErrorCode::UnsupportedFormat => 14,
            QueryErrorCode::BadStatsArgument => 15,
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            QueryErrorCode::RowIndexOOB
            | QueryErrorCode::ArrowStatusErr
            | QueryErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with full context
#[derive(Debug)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QueryError {
    /// Create an error with an explicit code
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Malformed column descriptor text
    pub fn bad_col_info(segment: impl AsRef<str>) -> Self {
        Self::new(
            QueryErrorCode::BadColInfoFormat,
            format!("bad col info format: '{}'", segment.as_ref()),
        )
    }

    /// Column name not found in schema
    pub fn col_not_present(name: impl AsRef<str>) -> Self {
        Self::new(
            QueryErrorCode::RequestedColNotPresent,
            format!("colname={} not present in schema", name.as_ref()),
        )
    }

    /// Operator string not recognized
    pub fn op_not_recognized(op: impl AsRef<str>) -> Self {
        Self::new(
            QueryErrorCode::OpNotRecognized,
            format!("operator '{}' not recognized", op.as_ref()),
        )
    }

    /// Literal that does not parse as the target type
    pub fn bad_literal(value: impl AsRef<str>, reason: impl fmt::Display) -> Self {
        Self::new(
            QueryErrorCode::BadPredicateLiteral,
            format!("bad predicate literal '{}': {}", value.as_ref(), reason),
        )
    }

    /// Operator has no evaluator in the given domain
    pub fn comparison_not_defined(op: impl fmt::Display, domain: &str) -> Self {
        Self::new(
            QueryErrorCode::PredicateComparisonNotDefined,
            format!("comparison '{}' not defined for {}", op, domain),
        )
    }

    /// Row number beyond the table
    pub fn row_index_oob(rnum: u64, nrows: u64) -> Self {
        Self::new(
            QueryErrorCode::RowIndexOOB,
            format!("ERROR: rnum({}) > root.nrows({})", rnum, nrows),
        )
    }

    /// Columnar container failure
    pub fn arrow_status(reason: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::ArrowStatusErr, reason)
    }

    /// Input buffer failed validation
    pub fn data_corruption(reason: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::DataCorruption, reason)
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
