//! CLI command implementations
//!
//! Commands are one-shot: read one JSON document from stdin, write one
//! JSON line to stdout, log to stderr.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::columnar::{split, to_columnar, to_row, ColumnarTable};
use crate::executor::{
    process_stats, QueryExecutor, QueryRequest, BUCKET_COUNT_COL, BUCKET_MAX_COL, BUCKET_MIN_COL,
};
use crate::index::{build_key_prefix, IndexType};
use crate::observability::{Logger, ObservationScope, Severity};
use crate::schema::Value;
use crate::storage::{DataFormat, JsonTable, RowTable, NAME_DEFAULT};

use super::args::{Cli, Command, TargetFormat};
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_error, write_response, StatsInput, TableEnvelope};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum log severity (optional, default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Format of envelopes that do not name one (optional, default "ROW_FLEX")
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Shard size for `convert --split` (optional, default 1024)
    #[serde(default = "default_max_rows_per_shard")]
    pub max_rows_per_shard: usize,

    /// Database name given to tables that carry none (optional, default "*")
    #[serde(default = "default_name")]
    pub db_schema: String,

    /// Table name given to tables that carry none (optional, default "*")
    #[serde(default = "default_name")]
    pub table_name: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}
fn default_format() -> String {
    DataFormat::RowFlex.as_str().to_string()
}
fn default_max_rows_per_shard() -> usize {
    1024
}
fn default_name() -> String {
    NAME_DEFAULT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_format: default_format(),
            max_rows_per_shard: default_max_rows_per_shard(),
            db_schema: default_name(),
            table_name: default_name(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;
        self.format()?;

        if self.max_rows_per_shard == 0 {
            return Err(CliError::config_error("max_rows_per_shard must be > 0"));
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Parsed `default_format`
    pub fn format(&self) -> CliResult<DataFormat> {
        DataFormat::parse(&self.default_format)
            .map_err(|e| CliError::config_error(format!("Invalid default_format: {}", e.message())))
    }

    /// Replace default names in `table` with the configured ones
    fn fill_names(&self, table: &mut RowTable) {
        if table.meta.db_schema == NAME_DEFAULT {
            table.meta.db_schema = self.db_schema.clone();
        }
        if table.meta.table_name == NAME_DEFAULT {
            table.meta.table_name = self.table_name.clone();
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. A failure is
/// reported on stdout as an error envelope and returned.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = Config::resolve(cli.config.as_deref()).and_then(|config| {
        Logger::set_min_severity(config.severity()?);
        run_command(&config, cli.command)
    });
    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(config: &Config, cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query => query(),
        Command::Convert { to, split } => convert(config, to, split),
        Command::Inspect => inspect(config),
        Command::Stats => stats(config),
    }
}

/// Execute one query request from stdin
pub fn query() -> CliResult<()> {
    let request: QueryRequest = read_input()?;
    write_response(run_query(&request)?)
}

/// Response payload of one query
pub fn run_query(request: &QueryRequest) -> CliResult<JsonValue> {
    let response = QueryExecutor::new().execute(request);
    Ok(serde_json::to_value(&response)?)
}

/// Re-encode the table on stdin
pub fn convert(config: &Config, to: TargetFormat, split_shards: bool) -> CliResult<()> {
    let envelope: TableEnvelope = read_input()?;
    write_response(convert_envelope(config, &envelope, to, split_shards)?)
}

/// Converted table as an envelope, or a list of shard envelopes with
/// `split_shards`
pub fn convert_envelope(
    config: &Config,
    envelope: &TableEnvelope,
    to: TargetFormat,
    split_shards: bool,
) -> CliResult<JsonValue> {
    if split_shards && to != TargetFormat::Columnar {
        return Err(CliError::config_error("--split requires --to columnar"));
    }

    let scope = ObservationScope::new("CONVERT");
    let table = decode_table(config, envelope)?;

    let data = match to {
        TargetFormat::Row => serde_json::to_value(TableEnvelope {
            format: Some(DataFormat::RowFlex),
            bytes: table.serialize(),
        })?,
        TargetFormat::Columnar => {
            let columnar = to_columnar(&table, None)?;
            if split_shards {
                let shards = split(&columnar, config.max_rows_per_shard)?
                    .iter()
                    .map(|shard| {
                        Ok(TableEnvelope {
                            format: Some(DataFormat::Columnar),
                            bytes: shard.encode()?,
                        })
                    })
                    .collect::<CliResult<Vec<_>>>()?;
                json!({ "shards": shards })
            } else {
                serde_json::to_value(TableEnvelope {
                    format: Some(DataFormat::Columnar),
                    bytes: columnar.encode()?,
                })?
            }
        }
    };

    scope.complete_with_fields(&[("rows", table.nrows().to_string().as_str())]);
    Ok(data)
}

/// Print the table on stdin as JSON
pub fn inspect(config: &Config) -> CliResult<()> {
    let envelope: TableEnvelope = read_input()?;
    write_response(inspect_envelope(config, &envelope)?)
}

/// Metadata, record-index key prefix and rows of a table
pub fn inspect_envelope(config: &Config, envelope: &TableEnvelope) -> CliResult<JsonValue> {
    let table = decode_table(config, envelope)?;
    let meta = &table.meta;
    let schema = table.schema()?;

    let rows: Vec<JsonValue> = table
        .rows
        .iter()
        .enumerate()
        .map(|(rnum, rec)| {
            json!({
                "rid": rec.rid,
                "deleted": table.is_deleted(rnum),
                "values": rec.values.iter().map(cell_json).collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(json!({
        "db_schema": meta.db_schema,
        "table_name": meta.table_name,
        "data_schema": meta.data_schema,
        "num_rows": meta.nrows,
        "skyhook_version": meta.skyhook_version,
        "key_prefix": build_key_prefix(IndexType::Rec, &meta.db_schema, &meta.table_name, &schema.colnames()),
        "rows": rows,
    }))
}

/// Histogram of the table on stdin
pub fn stats(config: &Config) -> CliResult<()> {
    let input: StatsInput = read_input()?;
    write_response(stats_envelope(config, &input)?)
}

/// Buckets of the requested histogram, plus the histogram as a row table
pub fn stats_envelope(config: &Config, input: &StatsInput) -> CliResult<JsonValue> {
    let scope = ObservationScope::with_fields("STATS", &[("column", input.stats.col_name.as_str())]);
    let table = decode_table(config, &input.table)?;
    let result = process_stats(&table, &input.stats)?;
    let histogram = RowTable::deserialize(&result.output_bytes)?;

    let names = [BUCKET_MIN_COL, BUCKET_MAX_COL, BUCKET_COUNT_COL];
    let buckets: Vec<JsonValue> = histogram
        .rows
        .iter()
        .map(|rec| {
            let bucket: serde_json::Map<String, JsonValue> = names
                .iter()
                .zip(&rec.values)
                .map(|(name, value)| (name.to_string(), cell_json(value)))
                .collect();
            JsonValue::Object(bucket)
        })
        .collect();

    scope.complete_with_fields(&[("buckets", buckets.len().to_string().as_str())]);
    Ok(json!({
        "buckets": buckets,
        "table": TableEnvelope {
            format: Some(DataFormat::RowFlex),
            bytes: result.output_bytes,
        },
    }))
}

/// Decode an envelope into a row table, whatever its format
fn decode_table(config: &Config, envelope: &TableEnvelope) -> CliResult<RowTable> {
    let format = match envelope.format {
        Some(format) => format,
        None => config.format()?,
    };
    let mut table = match format {
        DataFormat::RowFlex => RowTable::deserialize(&envelope.bytes)?,
        DataFormat::Json => JsonTable::from_slice(&envelope.bytes)?.into_row_table()?,
        DataFormat::Columnar => to_row(&ColumnarTable::decode(&envelope.bytes)?)?,
    };
    config.fill_names(&mut table);
    Ok(table)
}

/// JSON scalar form of a cell
fn cell_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(v) => json!(v),
        Value::Int8(v) => json!(v),
        Value::Int16(v) => json!(v),
        Value::Int32(v) => json!(v),
        Value::Int64(v) => json!(v),
        Value::UInt8(v) => json!(v),
        Value::UInt16(v) => json!(v),
        Value::UInt32(v) => json!(v),
        Value::UInt64(v) => json!(v),
        Value::Char(v) => json!(char::from(*v as u8).to_string()),
        Value::UChar(v) => json!(char::from(*v).to_string()),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::Date(s) | Value::Str(s) => json!(s),
        Value::List(_, items) => JsonValue::Array(items.iter().map(cell_json).collect()),
    }
}
