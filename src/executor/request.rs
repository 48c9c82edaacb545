//! Query request and response
//!
//! Field names follow the wire contract (`dataSchema`, `inputBytes`, ...).
//! Byte fields travel as standard base64 strings in JSON.

use serde::{Deserialize, Serialize};

use crate::errors::QueryError;
use crate::storage::DataFormat;

/// One query over one serialized table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Schema text of the stored table, empty to use the table's own
    #[serde(default)]
    pub data_schema: String,
    /// Projection: schema text, a comma separated name list, or `*`
    #[serde(default = "default_projection")]
    pub query_schema: String,
    /// `;col,op,value;...`
    #[serde(default)]
    pub predicates: String,
    /// `col1,col2` or empty
    #[serde(default)]
    pub group_by_cols: String,
    /// `;col,ASC|DESC;...` or empty
    #[serde(default)]
    pub order_by_cols: String,
    /// Explicit row subset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_numbers: Option<Vec<u32>>,
    #[serde(with = "base64_bytes")]
    pub input_bytes: Vec<u8>,
    pub input_format: DataFormat,
}

fn default_projection() -> String {
    "*".to_string()
}

impl QueryRequest {
    /// Project everything, no filters
    pub fn new(input_format: DataFormat, input_bytes: Vec<u8>) -> Self {
        Self {
            data_schema: String::new(),
            query_schema: default_projection(),
            predicates: String::new(),
            group_by_cols: String::new(),
            order_by_cols: String::new(),
            row_numbers: None,
            input_bytes,
            input_format,
        }
    }

    pub fn with_projection(mut self, query_schema: impl Into<String>) -> Self {
        self.query_schema = query_schema.into();
        self
    }

    pub fn with_predicates(mut self, predicates: impl Into<String>) -> Self {
        self.predicates = predicates.into();
        self
    }

    pub fn with_group_by(mut self, cols: impl Into<String>) -> Self {
        self.group_by_cols = cols.into();
        self
    }

    pub fn with_order_by(mut self, cols: impl Into<String>) -> Self {
        self.order_by_cols = cols.into();
        self
    }

    pub fn with_rows(mut self, rows: Vec<u32>) -> Self {
        self.row_numbers = Some(rows);
        self
    }
}

/// Output table plus the first error code and all error messages.
///
/// `output_bytes` is always a complete container, even when `error_code`
/// is nonzero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(with = "base64_bytes")]
    pub output_bytes: Vec<u8>,
    pub error_code: i32,
    pub error_message: String,
}

impl QueryResponse {
    pub fn ok(output_bytes: Vec<u8>) -> Self {
        Self {
            output_bytes,
            error_code: 0,
            error_message: String::new(),
        }
    }

    /// Response carrying `errors`; the first one sets the code
    pub fn with_errors(output_bytes: Vec<u8>, errors: &[QueryError]) -> Self {
        let error_code = errors.first().map(|e| e.code().number()).unwrap_or(0);
        let error_message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            output_bytes,
            error_code,
            error_message,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryErrorCode;

    #[test]
    fn test_request_json_shape() {
        let req = QueryRequest::new(DataFormat::Columnar, vec![1, 2, 3]).with_rows(vec![0, 2]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["inputBytes"], "AQID");
        assert_eq!(json["inputFormat"], "COLUMNAR");
        assert_eq!(json["querySchema"], "*");
        assert_eq!(json["rowNumbers"], serde_json::json!([0, 2]));
    }

    #[test]
    fn test_request_defaults() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"inputBytes": "AQID", "inputFormat": "ROW_FLEX"}"#).unwrap();
        assert_eq!(req.input_bytes, vec![1, 2, 3]);
        assert_eq!(req.query_schema, "*");
        assert!(req.row_numbers.is_none());
    }

    #[test]
    fn test_bad_base64_rejected() {
        let res: Result<QueryRequest, _> =
            serde_json::from_str(r#"{"inputBytes": "%%%", "inputFormat": "JSON"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_response_with_errors() {
        let errors = vec![
            QueryError::new(QueryErrorCode::RequestedColIndexOOB, "a"),
            QueryError::new(QueryErrorCode::RequestedColIndexOOB, "b"),
        ];
        let resp = QueryResponse::with_errors(vec![], &errors);
        assert_eq!(resp.error_code, QueryErrorCode::RequestedColIndexOOB.number());
        assert_eq!(resp.error_message.lines().count(), 2);
        assert!(!resp.is_ok());
    }
}
