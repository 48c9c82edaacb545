//! Typed predicates
//!
//! A single predicate type covers the whole scalar domain: the literal is a
//! [`Value`] of the target column's type, checked when the predicate is
//! built.

use regex::Regex;

use super::ops::Op;
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{ColInfo, Domain, ScalarType, Value};

/// One predicate of a query
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Target column index, -1 for the row id
    pub col_idx: i32,
    /// Target column type
    pub col_type: ScalarType,
    pub op: Op,
    /// How the result joins the running row decision
    pub chain_op: Op,
    /// Literal, `Null` for aggregates
    pub literal: Value,
    pattern: Option<Regex>,
}

impl Predicate {
    /// Build a predicate on `col`, validating the operator against the type
    pub fn new(col: &ColInfo, op: Op, literal: Value) -> QueryResult<Self> {
        if col.col_type.is_jagged() {
            return Err(QueryError::new(
                QueryErrorCode::UnsupportedSkyDataType,
                format!("predicates on {} column {} not supported", col.col_type, col.name),
            ));
        }

        if op.is_agg() {
            check_agg_type(col, op)?;
            return Ok(Self {
                col_idx: col.idx,
                col_type: col.col_type,
                op,
                chain_op: Op::LogicalAnd,
                literal: Value::Null,
                pattern: None,
            });
        }

        if !literal.fits(col.col_type) || literal.is_null() {
            return Err(QueryError::bad_literal(
                format!("{:?}", literal),
                format!("not a {} literal", col.col_type),
            ));
        }

        let pattern = if op == Op::Like {
            let text = like_text(&literal)
                .ok_or_else(|| QueryError::comparison_not_defined(op, col.col_type.name()))?;
            Some(Regex::new(&text).map_err(|e| QueryError::bad_literal(&text, e))?)
        } else {
            None
        };

        Ok(Self {
            col_idx: col.idx,
            col_type: col.col_type,
            op,
            chain_op: Op::LogicalAnd,
            literal,
            pattern,
        })
    }

    /// Set the chain operator, `logical_and` or `logical_or`
    pub fn with_chain(mut self, chain_op: Op) -> QueryResult<Self> {
        if !chain_op.is_chain() {
            return Err(QueryError::new(
                QueryErrorCode::OpNotRecognized,
                format!("'{}' is not a chain operator", chain_op),
            ));
        }
        self.chain_op = chain_op;
        Ok(self)
    }

    /// Accumulates across rows instead of filtering
    pub fn is_global_agg(&self) -> bool {
        self.op.is_agg()
    }

    /// Compiled pattern of a `like` predicate
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn is_rid(&self) -> bool {
        self.col_idx == crate::schema::RID_COL_INDEX
    }

    /// Descriptor of the target column, enough to read its cells
    pub fn target(&self) -> ColInfo {
        if self.is_rid() {
            return ColInfo::rid();
        }
        ColInfo::new(self.col_idx, self.col_type, false, true, "")
    }
}

/// Parse a literal for a column type
pub fn parse_literal(col_type: ScalarType, text: &str) -> QueryResult<Value> {
    let bad = |reason: &dyn std::fmt::Display| QueryError::bad_literal(text, reason);
    let trimmed = text.trim();

    let value = match col_type {
        ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64 => {
            let v: i64 = trimmed.parse().map_err(|e| bad(&e))?;
            match col_type {
                ScalarType::Int8 => Value::Int8(i8::try_from(v).map_err(|e| bad(&e))?),
                ScalarType::Int16 => Value::Int16(i16::try_from(v).map_err(|e| bad(&e))?),
                ScalarType::Int32 => Value::Int32(i32::try_from(v).map_err(|e| bad(&e))?),
                _ => Value::Int64(v),
            }
        }
        ScalarType::UInt8 | ScalarType::UInt16 | ScalarType::UInt32 | ScalarType::UInt64 => {
            let v: u64 = trimmed.parse().map_err(|e| bad(&e))?;
            match col_type {
                ScalarType::UInt8 => Value::UInt8(u8::try_from(v).map_err(|e| bad(&e))?),
                ScalarType::UInt16 => Value::UInt16(u16::try_from(v).map_err(|e| bad(&e))?),
                ScalarType::UInt32 => Value::UInt32(u32::try_from(v).map_err(|e| bad(&e))?),
                _ => Value::UInt64(v),
            }
        }
        ScalarType::Float => Value::Float(trimmed.parse().map_err(|e| bad(&e))?),
        ScalarType::Double => Value::Double(trimmed.parse().map_err(|e| bad(&e))?),
        ScalarType::Bool => match trimmed {
            "1" | "true" => Value::Bool(true),
            "0" | "false" => Value::Bool(false),
            _ => return Err(bad(&"expected 0, 1, true or false")),
        },
        ScalarType::Char => {
            let b = text.as_bytes().first().ok_or_else(|| bad(&"empty char"))?;
            Value::Char(*b as i8)
        }
        ScalarType::UChar => {
            let b = text.as_bytes().first().ok_or_else(|| bad(&"empty char"))?;
            Value::UChar(*b)
        }
        ScalarType::Date => Value::Date(text.to_string()),
        ScalarType::String => Value::Str(text.to_string()),
        other => {
            return Err(QueryError::new(
                QueryErrorCode::UnsupportedSkyDataType,
                format!("no literal form for {}", other),
            ))
        }
    };
    Ok(value)
}

/// Render a literal back into predicate text
pub fn literal_to_string(value: &Value) -> String {
    match value {
        Value::Null => "0".to_string(),
        Value::Bool(b) => u8::from(*b).to_string(),
        Value::Char(c) => char::from(*c as u8).to_string(),
        Value::UChar(c) => char::from(*c).to_string(),
        other => other.key_string(),
    }
}

fn like_text(literal: &Value) -> Option<String> {
    match literal {
        Value::Str(s) | Value::Date(s) => Some(s.clone()),
        Value::Char(c) => Some(char::from(*c as u8).to_string()),
        Value::UChar(c) => Some(char::from(*c).to_string()),
        _ => None,
    }
}

fn check_agg_type(col: &ColInfo, op: Op) -> QueryResult<()> {
    let numeric = matches!(
        col.col_type.domain(),
        Domain::Signed | Domain::Unsigned | Domain::Float
    );
    if numeric || op == Op::Cnt {
        Ok(())
    } else {
        Err(QueryError::new(
            QueryErrorCode::UnsupportedAggDataType,
            format!("{} over {} column {} not supported", op, col.col_type, col.name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(t: ScalarType) -> ColInfo {
        ColInfo::new(0, t, false, false, "C")
    }

    #[test]
    fn test_parse_literal_per_type() {
        assert_eq!(parse_literal(ScalarType::Int32, "-5").unwrap(), Value::Int32(-5));
        assert_eq!(parse_literal(ScalarType::UInt8, "200").unwrap(), Value::UInt8(200));
        assert_eq!(parse_literal(ScalarType::Double, "2.5").unwrap(), Value::Double(2.5));
        assert_eq!(parse_literal(ScalarType::Bool, "true").unwrap(), Value::Bool(true));
        assert_eq!(parse_literal(ScalarType::Char, "Qx").unwrap(), Value::Char(b'Q' as i8));
        assert_eq!(
            parse_literal(ScalarType::String, "hello world").unwrap(),
            Value::Str("hello world".into())
        );
    }

    #[test]
    fn test_parse_literal_range_checked() {
        let err = parse_literal(ScalarType::Int8, "300").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BadPredicateLiteral);
        assert!(parse_literal(ScalarType::UInt32, "-1").is_err());
        assert!(parse_literal(ScalarType::Int64, "abc").is_err());
    }

    #[test]
    fn test_like_compiles_pattern() {
        let p = Predicate::new(&col(ScalarType::String), Op::Like, Value::Str("^ab.*".into()))
            .unwrap();
        assert!(p.pattern().unwrap().is_match("abc"));
    }

    #[test]
    fn test_like_bad_pattern() {
        let err = Predicate::new(&col(ScalarType::String), Op::Like, Value::Str("(".into()))
            .unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BadPredicateLiteral);
    }

    #[test]
    fn test_agg_type_check() {
        assert!(Predicate::new(&col(ScalarType::Double), Op::Sum, Value::Null).is_ok());
        assert!(Predicate::new(&col(ScalarType::String), Op::Cnt, Value::Null).is_ok());
        let err = Predicate::new(&col(ScalarType::String), Op::Max, Value::Null).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnsupportedAggDataType);
    }

    #[test]
    fn test_literal_must_match_column() {
        assert!(Predicate::new(&col(ScalarType::Int64), Op::Eq, Value::Int32(1)).is_err());
    }

    #[test]
    fn test_chain_operator() {
        let p = Predicate::new(&col(ScalarType::Int64), Op::Eq, Value::Int64(1)).unwrap();
        assert_eq!(p.chain_op, Op::LogicalAnd);
        let p = p.with_chain(Op::LogicalOr).unwrap();
        assert_eq!(p.chain_op, Op::LogicalOr);
        assert!(p.with_chain(Op::Lt).is_err());
    }
}
