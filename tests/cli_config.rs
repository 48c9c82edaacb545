//! CLI Configuration Tests
//!
//! - Config files are optional; absent fields take their defaults
//! - Invalid values are rejected at load time
//! - Conversion and inspection honour the configured defaults

use std::fs;

use skyquery::cli::{convert_envelope, inspect_envelope, Config, TableEnvelope, TargetFormat};
use skyquery::columnar::{to_row, ColumnarTable};
use skyquery::storage::DataFormat;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("skyquery.json");
    fs::write(&path, body).unwrap();
    path
}

fn json_table(rows: usize) -> Vec<u8> {
    let rows: Vec<String> = (0..rows).map(|i| format!("[{}, \"r{}\"]", i, i)).collect();
    format!(
        r#"{{"schema": "0 3 0 0 ID;1 15 0 1 NAME", "rows": [{}]}}"#,
        rows.join(",")
    )
    .into_bytes()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_missing_path_uses_defaults() {
    let config = Config::resolve(None).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.max_rows_per_shard, 1024);
    assert_eq!(config.log_level, "INFO");
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"default_format": "JSON", "table_name": "orders"}"#);

    let config = Config::load(&path).unwrap();
    assert_eq!(config.format().unwrap(), DataFormat::Json);
    assert_eq!(config.table_name, "orders");
    assert_eq!(config.db_schema, "*");
    assert_eq!(config.max_rows_per_shard, 1024);
}

#[test]
fn test_invalid_files_rejected() {
    let dir = TempDir::new().unwrap();

    let path = write_config(&dir, r#"{"log_level": "LOUD"}"#);
    assert_eq!(Config::load(&path).unwrap_err().code_str(), "SKY_CLI_CONFIG_ERROR");

    let path = write_config(&dir, r#"{"max_rows_per_shard": 0}"#);
    assert!(Config::load(&path).is_err());

    let path = write_config(&dir, "not json");
    assert!(Config::load(&path).is_err());

    assert!(Config::load(&dir.path().join("absent.json")).is_err());
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_convert_uses_configured_shard_size_and_format() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"default_format": "JSON", "max_rows_per_shard": 3}"#);
    let config = Config::load(&path).unwrap();

    let envelope = TableEnvelope {
        format: None,
        bytes: json_table(7),
    };
    let data = convert_envelope(&config, &envelope, TargetFormat::Columnar, true).unwrap();
    let shards: Vec<TableEnvelope> = serde_json::from_value(data["shards"].clone()).unwrap();

    let sizes: Vec<usize> = shards
        .iter()
        .map(|s| ColumnarTable::decode(&s.bytes).unwrap().num_rows())
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);

    let last = to_row(&ColumnarTable::decode(&shards[2].bytes).unwrap()).unwrap();
    assert_eq!(last.rows[0].rid, 6);
}

#[test]
fn test_inspect_reports_configured_names() {
    let config = Config {
        db_schema: "shop".to_string(),
        table_name: "orders".to_string(),
        ..Config::default()
    };
    let envelope = TableEnvelope {
        format: Some(DataFormat::Json),
        bytes: json_table(2),
    };

    let data = inspect_envelope(&config, &envelope).unwrap();
    assert_eq!(data["db_schema"], "shop");
    assert_eq!(data["num_rows"], 2);
    assert_eq!(data["key_prefix"], "IDX_REC:shop-orders:ID-NAME:");
    assert_eq!(data["rows"][1]["values"][1], "r1");
}
