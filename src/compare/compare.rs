//! Comparison primitives
//!
//! Every numeric predicate is promoted to one of the four canonical domains
//! (i64, u64, f64, bool) before it reaches these functions. Dates and text
//! go through [`compare_str`].

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::{QueryError, QueryResult};
use crate::predicate::Op;
use crate::schema::ScalarType;

/// Accepted calendar date layouts
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

pub fn compare_i64(a: i64, b: i64, op: Op) -> QueryResult<bool> {
    if let Some(r) = relational(&a, &b, op) {
        return Ok(r);
    }
    logical(a != 0, b != 0, op).ok_or_else(|| QueryError::comparison_not_defined(op, "i64"))
}

pub fn compare_u64(a: u64, b: u64, op: Op) -> QueryResult<bool> {
    if let Some(r) = relational(&a, &b, op) {
        return Ok(r);
    }
    match op {
        Op::BitwiseAnd => Ok(a & b != 0),
        Op::BitwiseOr => Ok(a | b != 0),
        _ => logical(a != 0, b != 0, op)
            .ok_or_else(|| QueryError::comparison_not_defined(op, "u64")),
    }
}

pub fn compare_f64(a: f64, b: f64, op: Op) -> QueryResult<bool> {
    relational(&a, &b, op).ok_or_else(|| QueryError::comparison_not_defined(op, "f64"))
}

pub fn compare_bool(a: bool, b: bool, op: Op) -> QueryResult<bool> {
    if let Some(r) = relational(&a, &b, op) {
        return Ok(r);
    }
    match op {
        Op::BitwiseAnd => Ok(a & b),
        Op::BitwiseOr => Ok(a | b),
        _ => logical(a, b, op).ok_or_else(|| QueryError::comparison_not_defined(op, "bool")),
    }
}

/// Dates compare as calendar days, text supports only `like`
pub fn compare_str(a: &str, b: &str, op: Op, col_type: ScalarType) -> QueryResult<bool> {
    match col_type {
        ScalarType::Date => {
            let d1 = parse_date(a)?;
            let d2 = parse_date(b)?;
            match op {
                Op::Before | Op::Lt => Ok(d1 < d2),
                Op::After | Op::Gt => Ok(d1 > d2),
                Op::Leq => Ok(d1 <= d2),
                Op::Geq => Ok(d1 >= d2),
                Op::Eq => Ok(d1 == d2),
                Op::Ne => Ok(d1 != d2),
                _ => Err(QueryError::comparison_not_defined(op, "date")),
            }
        }
        ScalarType::String | ScalarType::Char | ScalarType::UChar if op == Op::Like => {
            let re = Regex::new(b).map_err(|e| QueryError::bad_literal(b, e))?;
            Ok(compare_like(&re, a))
        }
        _ => Err(QueryError::comparison_not_defined(op, col_type.name())),
    }
}

/// Partial regex match
pub fn compare_like(pattern: &Regex, value: &str) -> bool {
    pattern.is_match(value)
}

pub fn parse_date(text: &str) -> QueryResult<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| QueryError::bad_literal(text, "not a date"))
}

fn relational<T: PartialOrd>(a: &T, b: &T, op: Op) -> Option<bool> {
    match op {
        Op::Lt => Some(a < b),
        Op::Gt => Some(a > b),
        Op::Eq => Some(a == b),
        Op::Ne => Some(a != b),
        Op::Leq => Some(a <= b),
        Op::Geq => Some(a >= b),
        _ => None,
    }
}

fn logical(a: bool, b: bool, op: Op) -> Option<bool> {
    match op {
        Op::LogicalOr => Some(a || b),
        Op::LogicalAnd => Some(a && b),
        // not either
        Op::LogicalNot => Some(!a && !b),
        Op::LogicalNor => Some(!(a || b)),
        Op::LogicalNand => Some(!(a && b)),
        Op::LogicalXor => Some((a || b) && a != b),
        _ => None,
    }
}
