//! skyquery - query pushdown over serialized table partitions
//!
//! Evaluates projections, predicates, aggregates, group-by and order-by
//! against row-format and columnar table buffers and returns the result as
//! a buffer of the same format family.

pub mod cli;
pub mod columnar;
pub mod compare;
pub mod errors;
pub mod executor;
pub mod index;
pub mod observability;
pub mod predicate;
pub mod schema;
pub mod storage;
