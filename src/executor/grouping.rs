//! Group-by and aggregate folding
//!
//! Groups are keyed by the string form of their group-by cells and come
//! out in key order, null keys first. Within a group rows keep their input order, so the
//! first row is the group's representative.

use std::collections::BTreeMap;

use super::source::CellSource;
use crate::compare::AggState;
use crate::errors::QueryResult;
use crate::predicate::Predicate;
use crate::schema::ColInfo;

/// Partition `rows` by the values of `cols`
pub fn group_rows<S: CellSource + ?Sized>(
    source: &S,
    rows: &[usize],
    cols: &[ColInfo],
) -> QueryResult<Vec<Vec<usize>>> {
    let mut groups: BTreeMap<Vec<Option<String>>, Vec<usize>> = BTreeMap::new();
    for &row in rows {
        let key = cols
            .iter()
            .map(|c| source.cell(row, c).map(|v| v.group_key()))
            .collect::<QueryResult<Vec<_>>>()?;
        groups.entry(key).or_default().push(row);
    }
    Ok(groups.into_values().collect())
}

/// Fold `rows` through every aggregate predicate, in predicate order
pub fn fold_aggregates<S: CellSource + ?Sized>(
    source: &S,
    rows: &[usize],
    preds: &[Predicate],
) -> QueryResult<Vec<AggState>> {
    preds
        .iter()
        .filter(|p| p.is_global_agg())
        .map(|pred| {
            let target = pred.target();
            rows.iter().try_fold(AggState::new(pred.op, pred.col_type)?, |state, &row| {
                state.fold(&source.cell(row, &target)?)
            })
        })
        .collect()
}
