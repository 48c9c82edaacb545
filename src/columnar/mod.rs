//! Columnar storage adapter
//!
//! Chunked Arrow tables with the table metadata carried as schema-level
//! key/value pairs.
//!
//! # Invariants
//!
//! - The last two columns are always `RID` (Int64) and `DELETED_VECTOR` (Boolean)
//! - All columns of a chunk have the same length
//! - NUM_ROWS equals the rows actually present in the table
//! - Conversions never mutate their input

mod convert;
mod locate;
mod metadata;
mod reshape;
mod table;
mod types;

pub use convert::{to_columnar, to_row};
pub use locate::locate;
pub use metadata::{
    meta_from_map, meta_to_map, METADATA_DATA_FORMAT_TYPE, METADATA_DATA_SCHEMA,
    METADATA_DATA_SCHEMA_VERSION, METADATA_DATA_STRUCTURE_VERSION, METADATA_DB_SCHEMA,
    METADATA_KEYS, METADATA_NUM_ROWS, METADATA_SKYHOOK_VERSION, METADATA_TABLE_NAME,
};
pub use reshape::{combine, flatten, split};
pub use table::{arrow_schema, delvec_index, rid_index, ColumnarTable};
pub use types::{array_value, arrow_type, build_array};
