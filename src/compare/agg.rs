//! Aggregate fold
//!
//! Accumulation is a value: callers start from [`AggState::new`], feed each
//! passing cell through [`AggState::fold`] and read the result with
//! [`AggState::finish`]. Nothing is stored on the predicate.

use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::predicate::Op;
use crate::schema::{Domain, ScalarType, Value};

/// Running value in its canonical domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl AggValue {
    fn into_value(self) -> Value {
        match self {
            AggValue::Signed(v) => Value::Int64(v),
            AggValue::Unsigned(v) => Value::UInt64(v),
            AggValue::Float(v) => Value::Double(v),
        }
    }
}

/// Accumulator of one aggregate predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggState {
    op: Op,
    col_type: ScalarType,
    acc: AggValue,
}

impl AggState {
    /// Identity state for `op` over a column of `col_type`
    pub fn new(op: Op, col_type: ScalarType) -> QueryResult<Self> {
        let acc = match (op, col_type.domain()) {
            (Op::Cnt, _) => AggValue::Unsigned(0),
            (Op::Min, Domain::Signed) => AggValue::Signed(i64::MAX),
            (Op::Max, Domain::Signed) => AggValue::Signed(i64::MIN),
            (Op::Sum, Domain::Signed) => AggValue::Signed(0),
            (Op::Min, Domain::Unsigned) => AggValue::Unsigned(u64::MAX),
            (Op::Max, Domain::Unsigned) => AggValue::Unsigned(u64::MIN),
            (Op::Sum, Domain::Unsigned) => AggValue::Unsigned(0),
            (Op::Min, Domain::Float) => AggValue::Float(f64::MAX),
            (Op::Max, Domain::Float) => AggValue::Float(f64::MIN),
            (Op::Sum, Domain::Float) => AggValue::Float(0.0),
            _ => {
                return Err(QueryError::new(
                    QueryErrorCode::UnsupportedAggDataType,
                    format!("{} over {} not supported", op, col_type),
                ))
            }
        };
        Ok(Self { op, col_type, acc })
    }

    /// Fold one cell. Nulls are counted by `cnt` and skipped otherwise.
    pub fn fold(self, value: &Value) -> QueryResult<Self> {
        if self.op == Op::Cnt {
            return Ok(Self {
                acc: compute_agg(self.acc, AggValue::Unsigned(1), self.op),
                ..self
            });
        }
        if value.is_null() {
            return Ok(self);
        }

        let val = match self.acc {
            AggValue::Signed(_) => value.as_i64().map(AggValue::Signed),
            AggValue::Unsigned(_) => value.as_u64().map(AggValue::Unsigned),
            AggValue::Float(_) => value.as_f64().map(AggValue::Float),
        }
        .ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::ValueTypeMismatch,
                format!("{:?} cannot feed {} over {}", value, self.op, self.col_type),
            )
        })?;

        Ok(Self {
            acc: compute_agg(self.acc, val, self.op),
            ..self
        })
    }

    /// Final value
    pub fn finish(&self) -> Value {
        self.acc.into_value()
    }

    /// Type of the value [`finish`](Self::finish) returns
    pub fn result_type(&self) -> ScalarType {
        match self.acc {
            AggValue::Signed(_) => ScalarType::Int64,
            AggValue::Unsigned(_) => ScalarType::UInt64,
            AggValue::Float(_) => ScalarType::Double,
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }
}

/// One accumulation step. `cnt` adds the incoming value, which is always 1.
pub fn compute_agg(acc: AggValue, val: AggValue, op: Op) -> AggValue {
    match (acc, val) {
        (AggValue::Signed(a), AggValue::Signed(v)) => AggValue::Signed(match op {
            Op::Min => a.min(v),
            Op::Max => a.max(v),
            Op::Sum | Op::Cnt => a.wrapping_add(v),
            _ => a,
        }),
        (AggValue::Unsigned(a), AggValue::Unsigned(v)) => AggValue::Unsigned(match op {
            Op::Min => a.min(v),
            Op::Max => a.max(v),
            Op::Sum | Op::Cnt => a.wrapping_add(v),
            _ => a,
        }),
        (AggValue::Float(a), AggValue::Float(v)) => AggValue::Float(match op {
            Op::Min => a.min(v),
            Op::Max => a.max(v),
            Op::Sum => a + v,
            Op::Cnt => a + 1.0,
            _ => a,
        }),
        (acc, _) => acc,
    }
}
