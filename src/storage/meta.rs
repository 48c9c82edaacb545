//! Table metadata shared by the row and columnar forms

use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::Schema;

/// Wire version written into every table
pub const SKYHOOK_VERSION: u32 = 2;
/// Version of the table layout
pub const DATA_STRUCTURE_VERSION: u32 = 1;
/// Version of the schema encoding
pub const DATA_SCHEMA_VERSION: u32 = 1;

/// Fallback db-schema and table name
pub const NAME_DEFAULT: &str = "*";

/// Payload format tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    /// Row records with tagged values
    #[serde(rename = "ROW_FLEX")]
    RowFlex = 1,
    /// Arrow IPC stream
    #[serde(rename = "COLUMNAR")]
    Columnar = 2,
    /// JSON rows
    #[serde(rename = "JSON")]
    Json = 3,
}

impl DataFormat {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(DataFormat::RowFlex),
            2 => Some(DataFormat::Columnar),
            3 => Some(DataFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::RowFlex => "ROW_FLEX",
            DataFormat::Columnar => "COLUMNAR",
            DataFormat::Json => "JSON",
        }
    }

    /// Parse a format name, case-insensitive
    pub fn parse(name: &str) -> QueryResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "ROW_FLEX" | "ROW" => Ok(DataFormat::RowFlex),
            "COLUMNAR" | "ARROW" => Ok(DataFormat::Columnar),
            "JSON" => Ok(DataFormat::Json),
            other => Err(QueryError::new(
                QueryErrorCode::UnsupportedFormat,
                format!("unknown data format '{}'", other),
            )),
        }
    }
}

/// Version quadruple plus descriptive strings and row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub skyhook_version: u32,
    pub data_format_type: u32,
    pub data_structure_version: u32,
    pub data_schema_version: u32,
    /// Schema text of the stored columns
    pub data_schema: String,
    pub db_schema: String,
    pub table_name: String,
    pub nrows: u64,
}

impl TableMeta {
    /// Metadata for a new, empty table
    pub fn new(
        format: DataFormat,
        schema: &Schema,
        db_schema: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        let mut db_schema = db_schema.into();
        let mut table_name = table_name.into();
        if db_schema.trim().is_empty() {
            db_schema = NAME_DEFAULT.to_string();
        }
        if table_name.trim().is_empty() {
            table_name = NAME_DEFAULT.to_string();
        }
        Self {
            skyhook_version: SKYHOOK_VERSION,
            data_format_type: format.code(),
            data_structure_version: DATA_STRUCTURE_VERSION,
            data_schema_version: DATA_SCHEMA_VERSION,
            data_schema: schema.to_string(),
            db_schema,
            table_name,
            nrows: 0,
        }
    }

    /// Parsed form of `data_schema`
    pub fn schema(&self) -> QueryResult<Schema> {
        Schema::parse(&self.data_schema)
    }

    pub fn format(&self) -> Option<DataFormat> {
        DataFormat::from_code(self.data_format_type)
    }

    /// Copy carrying a different schema and row count
    pub fn derive(&self, schema: &Schema, nrows: u64) -> Self {
        Self {
            data_schema: schema.to_string(),
            nrows,
            ..self.clone()
        }
    }
}
