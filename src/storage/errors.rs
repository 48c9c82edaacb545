//! Codec error types

use thiserror::Error;

use crate::errors::{QueryError, QueryErrorCode};

/// Result type for encode/decode operations
pub type FormatResult<T> = Result<T, FormatError>;

/// Failures while encoding or decoding a table buffer
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt buffer: {0}")]
    Corrupt(String),
}

impl FormatError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        FormatError::Corrupt(reason.into())
    }
}

impl From<FormatError> for QueryError {
    fn from(err: FormatError) -> Self {
        let code = match &err {
            FormatError::Arrow(_) => QueryErrorCode::ArrowStatusErr,
            _ => QueryErrorCode::DataCorruption,
        };
        QueryError::new(code, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_maps_to_data_corruption() {
        let err: QueryError = FormatError::corrupt("bad magic").into();
        assert_eq!(err.code(), QueryErrorCode::DataCorruption);
        assert!(err.message().contains("bad magic"));
    }

    #[test]
    fn test_arrow_maps_to_arrow_status() {
        let arrow = arrow::error::ArrowError::InvalidArgumentError("x".into());
        let err: QueryError = FormatError::from(arrow).into();
        assert_eq!(err.code(), QueryErrorCode::ArrowStatusErr);
    }
}
