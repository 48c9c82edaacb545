//! Value comparator
//!
//! Type-dispatched comparison and aggregate accumulation over the scalar
//! domain. Narrow integer and float types never get their own comparison
//! code; they are promoted first.

mod agg;
mod compare;

pub use agg::{compute_agg, AggState, AggValue};
pub use compare::{
    compare_bool, compare_f64, compare_i64, compare_like, compare_str, compare_u64, parse_date,
};
