//! Schema model
//!
//! Column descriptors, the scalar type table, tagged cell values and the
//! textual schema grammar.
//!
//! # Invariants
//!
//! - Column indices are unique within a schema
//! - Schema order is output column order
//! - Text form parses back to the same schema, whitespace aside

mod parser;
mod types;
mod value;

pub use parser::{Schema, PROJECT_ALL};
pub use types::{
    ColInfo, Domain, ScalarType, AGG_COL_CNT, AGG_COL_LAST, AGG_COL_MAX, AGG_COL_MIN,
    AGG_COL_SUM, DELETED_VECTOR_COL_NAME, NUM_COL_INFO_FIELDS, RID_COL_INDEX, RID_COL_NAME,
};
pub use value::{FromValue, Value};
