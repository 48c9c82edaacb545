//! Predicate evaluation
//!
//! Two strategies share one cell evaluator:
//!
//! - row-wise: every predicate is applied to one row, the results joined
//!   through each predicate's chain operator with early exit on a failed AND
//! - column-wise: every predicate produces the set of passing row numbers
//!   for its column, and each set is joined to the running set by the
//!   chain operator of the predicate before it: union (OR) or intersection

use std::collections::BTreeSet;

use super::source::CellSource;
use crate::compare::{compare_bool, compare_f64, compare_i64, compare_like, compare_str, compare_u64};
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::predicate::{Op, Predicate};
use crate::schema::{Domain, ScalarType, Value};

/// Evaluates predicates against table cells
pub struct PredicateFilter;

impl PredicateFilter {
    /// Evaluate one non-aggregate predicate against one cell.
    ///
    /// Null cells never pass.
    pub fn eval_cell(pred: &Predicate, cell: &Value) -> QueryResult<bool> {
        if cell.is_null() {
            return Ok(false);
        }
        if pred.op == Op::Like {
            return Self::eval_like(pred, cell);
        }

        let mismatch = || {
            QueryError::new(
                QueryErrorCode::ValueTypeMismatch,
                format!("{:?} is not a {} cell", cell, pred.col_type),
            )
        };

        match pred.col_type.domain() {
            Domain::Signed => {
                let a = cell.as_i64().ok_or_else(mismatch)?;
                let b = pred.literal.as_i64().ok_or_else(mismatch)?;
                compare_i64(a, b, pred.op)
            }
            Domain::Unsigned => {
                let a = cell.as_u64().ok_or_else(mismatch)?;
                let b = pred.literal.as_u64().ok_or_else(mismatch)?;
                compare_u64(a, b, pred.op)
            }
            Domain::Float => {
                let a = cell.as_f64().ok_or_else(mismatch)?;
                let b = pred.literal.as_f64().ok_or_else(mismatch)?;
                compare_f64(a, b, pred.op)
            }
            Domain::Bool => {
                let a = cell.as_bool().ok_or_else(mismatch)?;
                let b = pred.literal.as_bool().ok_or_else(mismatch)?;
                compare_bool(a, b, pred.op)
            }
            Domain::Date | Domain::Text => {
                let a = cell.as_str().ok_or_else(mismatch)?;
                let b = pred.literal.as_str().ok_or_else(mismatch)?;
                compare_str(a, b, pred.op, pred.col_type)
            }
            Domain::List => Err(QueryError::new(
                QueryErrorCode::UnsupportedSkyDataType,
                format!("no comparison over {}", pred.col_type),
            )),
        }
    }

    fn eval_like(pred: &Predicate, cell: &Value) -> QueryResult<bool> {
        let pattern = pred
            .pattern()
            .ok_or_else(|| QueryError::comparison_not_defined(pred.op, pred.col_type.name()))?;
        let text = match (pred.col_type, cell) {
            (ScalarType::Char, Value::Char(c)) => char::from(*c as u8).to_string(),
            (ScalarType::UChar, Value::UChar(c)) => char::from(*c).to_string(),
            (ScalarType::String, Value::Str(s)) => s.clone(),
            _ => return Err(QueryError::comparison_not_defined(pred.op, pred.col_type.name())),
        };
        Ok(compare_like(pattern, &text))
    }

    /// Row-wise decision for one row.
    ///
    /// The running decision starts false when the first predicate chains
    /// with OR, true otherwise. Aggregate predicates are skipped. A row with
    /// no predicates passes.
    pub fn matches_row<S: CellSource + ?Sized>(
        source: &S,
        row: usize,
        preds: &[Predicate],
    ) -> QueryResult<bool> {
        let mut pass = preds
            .first()
            .map(|p| p.chain_op != Op::LogicalOr)
            .unwrap_or(true);

        for pred in preds.iter().filter(|p| !p.is_global_agg()) {
            if pred.chain_op == Op::LogicalAnd && !pass {
                break;
            }
            let cell = source.cell(row, &pred.target())?;
            let result = Self::eval_cell(pred, &cell)?;
            if pred.chain_op == Op::LogicalOr {
                pass |= result;
            } else {
                pass &= result;
            }
        }
        Ok(pass)
    }

    /// Keep the rows of `candidates` that pass row-wise, in input order
    pub fn filter_rows<S: CellSource + ?Sized>(
        source: &S,
        candidates: &[usize],
        preds: &[Predicate],
    ) -> QueryResult<Vec<usize>> {
        let mut passed = Vec::with_capacity(candidates.len());
        for &row in candidates {
            if Self::matches_row(source, row, preds)? {
                passed.push(row);
            }
        }
        Ok(passed)
    }

    /// Column-wise evaluation over `candidates`.
    ///
    /// The first predicate's passing set seeds the result. Every later set
    /// is merged by union when the previous predicate chains with OR and by
    /// intersection otherwise. Returned rows are ascending.
    pub fn filter_columns<S: CellSource + ?Sized>(
        source: &S,
        candidates: &[usize],
        preds: &[Predicate],
    ) -> QueryResult<Vec<usize>> {
        let mut running: Option<BTreeSet<usize>> = None;
        let mut prev_chain = Op::LogicalAnd;

        for pred in preds.iter().filter(|p| !p.is_global_agg()) {
            let target = pred.target();
            let mut passed = BTreeSet::new();
            for &row in candidates {
                if Self::eval_cell(pred, &source.cell(row, &target)?)? {
                    passed.insert(row);
                }
            }
            running = Some(match running {
                None => passed,
                Some(acc) if prev_chain == Op::LogicalOr => acc.union(&passed).copied().collect(),
                Some(acc) => acc.intersection(&passed).copied().collect(),
            });
            prev_chain = pred.chain_op;
        }

        Ok(match running {
            Some(set) => set.into_iter().collect(),
            None => {
                let mut all = candidates.to_vec();
                all.sort_unstable();
                all
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::parse_predicates;
    use crate::schema::Schema;
    use crate::storage::{Record, RowTable};

    fn table() -> RowTable {
        let schema = Schema::parse("0 3 0 0 A;1 3 0 0 B;2 15 0 1 NAME;3 9 0 0 C;4 14 0 0 D").unwrap();
        let mut t = RowTable::new(&schema, "", "");
        let rows = [
            (5, 20, "alpha", b'Q', "2020-01-01"),
            (5, 3, "beta", b'V', "2021-06-30"),
            (1, 30, "gamma", b'Q', "2019-12-31"),
            (7, 11, "delta", b'Z', "2020-01-02"),
        ];
        for (i, (a, b, name, c, d)) in rows.iter().enumerate() {
            t.push(Record::new(
                i as i64,
                vec![
                    Value::Int32(*a),
                    Value::Int32(*b),
                    Value::Str(name.to_string()),
                    Value::Char(*c as i8),
                    Value::Date(d.to_string()),
                ],
            ));
        }
        t
    }

    fn run(text: &str) -> (Vec<usize>, Vec<usize>) {
        let t = table();
        let preds = parse_predicates(&t.schema().unwrap(), text).unwrap();
        let all: Vec<usize> = (0..t.nrows()).collect();
        (
            PredicateFilter::filter_rows(&t, &all, &preds).unwrap(),
            PredicateFilter::filter_columns(&t, &all, &preds).unwrap(),
        )
    }

    #[test]
    fn test_and_is_intersection() {
        let (rows, cols) = run(";A,eq,5;B,gt,10;");
        assert_eq!(rows, vec![0]);
        assert_eq!(cols, vec![0]);
    }

    #[test]
    fn test_or_is_union() {
        let (rows, _) = run(";A,eq,5;B,gt,10,logical_or;");
        assert_eq!(rows, vec![0, 1, 2, 3]);

        // A == 7 is {3}, B == 30 is {2}
        let (_, cols) = run(";A,eq,7,logical_or;B,eq,30;");
        assert_eq!(cols, vec![2, 3]);
    }

    #[test]
    fn test_column_chain_uses_previous_operator() {
        // A == 1 is {2}, B == 99 is {}
        let (_, cols) = run(";A,eq,1,logical_or;B,eq,99;");
        assert_eq!(cols, vec![2]);

        // A == 5 is {0, 1}, B == 30 is {2}: the OR on B has no later set
        let (_, cols) = run(";A,eq,5;B,eq,30,logical_or;");
        assert!(cols.is_empty());
    }

    #[test]
    fn test_no_predicates_pass_all() {
        let (rows, cols) = run("");
        assert_eq!(rows, vec![0, 1, 2, 3]);
        assert_eq!(cols, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_like_on_string_and_char() {
        let (rows, _) = run(";NAME,like,^[ab];");
        assert_eq!(rows, vec![0, 1]);
        let (rows, _) = run(";C,like,Q;");
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn test_dates_compare_as_days() {
        let (rows, _) = run(";D,before,2020/01/02;");
        assert_eq!(rows, vec![0, 2]);
        let (rows, _) = run(";D,geq,2020-01-02;");
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_rid_predicate() {
        let (rows, cols) = run(";RID,geq,2;");
        assert_eq!(rows, vec![2, 3]);
        assert_eq!(cols, vec![2, 3]);
    }

    #[test]
    fn test_undefined_comparison_errors() {
        let t = table();
        let preds = parse_predicates(&t.schema().unwrap(), ";NAME,eq,beta;").unwrap();
        let err = PredicateFilter::filter_rows(&t, &[0], &preds).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::PredicateComparisonNotDefined);
    }

    #[test]
    fn test_null_cell_fails() {
        let pred = Predicate::new(
            &crate::schema::ColInfo::new(0, ScalarType::Int32, false, true, "A"),
            Op::Eq,
            Value::Int32(1),
        )
        .unwrap();
        assert!(!PredicateFilter::eval_cell(&pred, &Value::Null).unwrap());
    }
}
