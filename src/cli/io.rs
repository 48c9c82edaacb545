//! JSON I/O handling for CLI
//!
//! - Input: one JSON document on stdin
//! - Output: one JSON line on stdout, `{"status":"ok","data":...}` or
//!   `{"status":"error","code":...,"message":...}`
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::executor::{base64_bytes, StatsRequest};
use crate::storage::DataFormat;

/// Table bytes in transit, tagged with their format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEnvelope {
    /// Falls back to the configured default format when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DataFormat>,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Input of the `stats` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsInput {
    pub table: TableEnvelope,
    pub stats: StatsRequest,
}

/// Parse one JSON document
pub fn parse_input<T: DeserializeOwned>(text: &str) -> CliResult<T> {
    if text.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(text)?)
}

/// Read one JSON document from stdin
pub fn read_input<T: DeserializeOwned>() -> CliResult<T> {
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    parse_input(&text)
}

/// Success envelope
pub fn ok_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_envelope(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_envelope(code, message))
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_base64() {
        let env: TableEnvelope = parse_input(r#"{"format":"COLUMNAR","bytes":"AQID"}"#).unwrap();
        assert_eq!(env.format, Some(DataFormat::Columnar));
        assert_eq!(env.bytes, vec![1, 2, 3]);

        let env: TableEnvelope = parse_input(r#"{"bytes":""}"#).unwrap();
        assert!(env.format.is_none());
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = parse_input::<TableEnvelope>("  \n").unwrap_err();
        assert_eq!(err.code_str(), "SKY_CLI_IO_ERROR");
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = ok_envelope(serde_json::json!({"n": 1}));
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["data"]["n"], 1);

        let err = error_envelope("SKY_CLI_IO_ERROR", "boom");
        assert_eq!(err["status"], "error");
        assert_eq!(err["message"], "boom");
    }
}
