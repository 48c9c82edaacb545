//! Schema-level key/value metadata of a columnar table

use std::collections::HashMap;

use crate::errors::{QueryError, QueryResult};
use crate::storage::TableMeta;

pub const METADATA_SKYHOOK_VERSION: &str = "SKYHOOK_VERSION";
pub const METADATA_DATA_SCHEMA_VERSION: &str = "DATA_SCHEMA_VERSION";
pub const METADATA_DATA_STRUCTURE_VERSION: &str = "DATA_STRUCTURE_VERSION";
pub const METADATA_DATA_FORMAT_TYPE: &str = "DATA_FORMAT_TYPE";
pub const METADATA_DATA_SCHEMA: &str = "DATA_SCHEMA";
pub const METADATA_DB_SCHEMA: &str = "DB_SCHEMA";
pub const METADATA_TABLE_NAME: &str = "TABLE_NAME";
pub const METADATA_NUM_ROWS: &str = "NUM_ROWS";

/// All keys, in their canonical order
pub const METADATA_KEYS: [&str; 8] = [
    METADATA_SKYHOOK_VERSION,
    METADATA_DATA_SCHEMA_VERSION,
    METADATA_DATA_STRUCTURE_VERSION,
    METADATA_DATA_FORMAT_TYPE,
    METADATA_DATA_SCHEMA,
    METADATA_DB_SCHEMA,
    METADATA_TABLE_NAME,
    METADATA_NUM_ROWS,
];

/// String-valued side table for a [`TableMeta`]
pub fn meta_to_map(meta: &TableMeta) -> HashMap<String, String> {
    let pairs = [
        (METADATA_SKYHOOK_VERSION, meta.skyhook_version.to_string()),
        (METADATA_DATA_SCHEMA_VERSION, meta.data_schema_version.to_string()),
        (METADATA_DATA_STRUCTURE_VERSION, meta.data_structure_version.to_string()),
        (METADATA_DATA_FORMAT_TYPE, meta.data_format_type.to_string()),
        (METADATA_DATA_SCHEMA, meta.data_schema.clone()),
        (METADATA_DB_SCHEMA, meta.db_schema.clone()),
        (METADATA_TABLE_NAME, meta.table_name.clone()),
        (METADATA_NUM_ROWS, meta.nrows.to_string()),
    ];
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Rebuild a [`TableMeta`]; every key must be present
pub fn meta_from_map(map: &HashMap<String, String>) -> QueryResult<TableMeta> {
    let get = |key: &str| -> QueryResult<&String> {
        map.get(key)
            .ok_or_else(|| QueryError::arrow_status(format!("metadata key {} missing", key)))
    };
    let number = |key: &str| -> QueryResult<u64> {
        let raw = get(key)?;
        raw.trim().parse::<u64>().map_err(|_| {
            QueryError::arrow_status(format!("metadata key {} is not a number: '{}'", key, raw))
        })
    };
    let small = |key: &str| -> QueryResult<u32> {
        u32::try_from(number(key)?)
            .map_err(|_| QueryError::arrow_status(format!("metadata key {} out of range", key)))
    };

    Ok(TableMeta {
        skyhook_version: small(METADATA_SKYHOOK_VERSION)?,
        data_format_type: small(METADATA_DATA_FORMAT_TYPE)?,
        data_structure_version: small(METADATA_DATA_STRUCTURE_VERSION)?,
        data_schema_version: small(METADATA_DATA_SCHEMA_VERSION)?,
        data_schema: get(METADATA_DATA_SCHEMA)?.clone(),
        db_schema: get(METADATA_DB_SCHEMA)?.clone(),
        table_name: get(METADATA_TABLE_NAME)?.clone(),
        nrows: number(METADATA_NUM_ROWS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::storage::DataFormat;

    #[test]
    fn test_map_round_trip() {
        let schema = Schema::parse("0 4 1 0 ID").unwrap();
        let mut meta = TableMeta::new(DataFormat::Columnar, &schema, "db", "t");
        meta.nrows = 17;
        let map = meta_to_map(&meta);
        assert_eq!(map.len(), METADATA_KEYS.len());
        assert_eq!(map[METADATA_NUM_ROWS], "17");
        assert_eq!(map[METADATA_DATA_FORMAT_TYPE], "2");
        assert_eq!(meta_from_map(&map).unwrap(), meta);
    }

    #[test]
    fn test_missing_key() {
        let schema = Schema::parse("0 4 1 0 ID").unwrap();
        let mut map = meta_to_map(&TableMeta::new(DataFormat::Columnar, &schema, "", ""));
        map.remove(METADATA_TABLE_NAME);
        assert!(meta_from_map(&map).is_err());
    }

    #[test]
    fn test_bad_number() {
        let schema = Schema::parse("0 4 1 0 ID").unwrap();
        let mut map = meta_to_map(&TableMeta::new(DataFormat::Columnar, &schema, "", ""));
        map.insert(METADATA_NUM_ROWS.to_string(), "many".to_string());
        assert!(meta_from_map(&map).is_err());
    }
}
