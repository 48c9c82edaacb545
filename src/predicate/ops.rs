//! Operator table

use std::fmt;
use std::str::FromStr;

use crate::errors::QueryError;

/// Predicate operator. Codes follow the textual table order, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Lt = 1,
    Gt,
    Eq,
    Ne,
    Leq,
    Geq,
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Sum,
    Cnt,
    Like,
    In,
    NotIn,
    Before,
    Between,
    After,
    LogicalOr,
    LogicalAnd,
    LogicalNot,
    LogicalNor,
    LogicalXor,
    LogicalNand,
    BitwiseAnd,
    BitwiseOr,
}

const OP_NAMES: [(Op, &str); 28] = [
    (Op::Lt, "lt"),
    (Op::Gt, "gt"),
    (Op::Eq, "eq"),
    (Op::Ne, "ne"),
    (Op::Leq, "leq"),
    (Op::Geq, "geq"),
    (Op::Add, "add"),
    (Op::Sub, "sub"),
    (Op::Mul, "mul"),
    (Op::Div, "div"),
    (Op::Min, "min"),
    (Op::Max, "max"),
    (Op::Sum, "sum"),
    (Op::Cnt, "cnt"),
    (Op::Like, "like"),
    (Op::In, "in"),
    (Op::NotIn, "not_in"),
    (Op::Before, "before"),
    (Op::Between, "between"),
    (Op::After, "after"),
    (Op::LogicalOr, "logical_or"),
    (Op::LogicalAnd, "logical_and"),
    (Op::LogicalNot, "logical_not"),
    (Op::LogicalNor, "logical_nor"),
    (Op::LogicalXor, "logical_xor"),
    (Op::LogicalNand, "logical_nand"),
    (Op::BitwiseAnd, "bitwise_and"),
    (Op::BitwiseOr, "bitwise_or"),
];

impl Op {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Op> {
        OP_NAMES.iter().map(|(op, _)| *op).find(|op| op.code() == code)
    }

    pub fn as_str(&self) -> &'static str {
        OP_NAMES
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// min, max, sum and cnt accumulate instead of filtering
    pub fn is_agg(&self) -> bool {
        matches!(self, Op::Min | Op::Max | Op::Sum | Op::Cnt)
    }

    /// Operators accepted as a predicate chain combinator
    pub fn is_chain(&self) -> bool {
        matches!(self, Op::LogicalOr | Op::LogicalAnd)
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        OP_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(op, _)| *op)
            .ok_or_else(|| QueryError::op_not_recognized(s))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryErrorCode;

    #[test]
    fn test_name_table_round_trip() {
        for (op, name) in OP_NAMES {
            assert_eq!(name.parse::<Op>().unwrap(), op);
            assert_eq!(op.as_str(), name);
            assert_eq!(Op::from_code(op.code()), Some(op));
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(Op::Lt.code(), 1);
        assert_eq!(Op::Like.code(), 15);
        assert_eq!(Op::BitwiseOr.code(), 28);
    }

    #[test]
    fn test_unknown_operator() {
        let err = "approx".parse::<Op>().unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::OpNotRecognized);
    }

    #[test]
    fn test_agg_ops() {
        assert!(Op::Cnt.is_agg());
        assert!(!Op::Add.is_agg());
        assert!(Op::LogicalOr.is_chain());
    }
}
