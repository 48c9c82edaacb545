//! Predicate model
//!
//! Predicates are built per query from text, evaluated, and dropped when the
//! call returns. Aggregate predicates carry no running value; accumulation
//! is an explicit fold owned by the executor (see `compare::AggState`).
//!
//! # Invariants
//!
//! - One scalar type per predicate, fixed by the target column
//! - Aggregate predicates follow every filtering predicate in a list
//! - Column index -1 is the row id, read from the record, not the row data

mod ops;
mod parser;
mod predicate;

pub use ops::Op;
pub use parser::{
    colnames_from_preds, parse_predicates, preds_to_string, PRED_DELIM_INNER, PRED_DELIM_OUTER,
    SELECT_ALL,
};
pub use predicate::{literal_to_string, parse_literal, Predicate};
