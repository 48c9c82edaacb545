//! Index key helpers
//!
//! String construction only; no index is built or stored here.
//!
//! # Invariants
//!
//! - Empty schema, table or column names render as `*`
//! - Value sections of one column type have a fixed width

mod keys;

pub use keys::{
    build_key_data, build_key_prefix, IndexType, IDX_KEY_COLS_DEFAULT, IDX_KEY_DELIM_INNER,
    IDX_KEY_DELIM_OUTER,
};
