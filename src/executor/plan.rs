//! Resolved query and the shared selection pipeline
//!
//! Pipeline order:
//!
//! 1. Candidate rows: explicit row numbers (bounds checked) or every row
//! 2. Drop tombstoned rows
//! 3. Filter with the non-aggregate predicates
//! 4. Group, or fold aggregates
//! 5. Order
//! 6. Project each surviving row (or group) into an output row

use super::filters::PredicateFilter;
use super::grouping::{fold_aggregates, group_rows};
use super::request::QueryRequest;
use super::result::{OutputRow, Selection};
use super::sorter::{parse_order_by, ResultSorter, SortSpec};
use super::source::CellSource;
use crate::compare::AggState;
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::predicate::{parse_predicates, Predicate};
use crate::schema::{ColInfo, Schema, Value, PROJECT_ALL, RID_COL_NAME};

/// How non-aggregate predicates are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStrategy {
    /// One row at a time, chained with early exit
    RowWise,
    /// One column at a time, row sets merged
    ColumnWise,
}

/// A request resolved against a data schema
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub data_schema: Schema,
    pub projection: Schema,
    /// Filters first, then aggregates
    pub predicates: Vec<Predicate>,
    pub group_by: Schema,
    pub order_by: Vec<SortSpec>,
    pub row_numbers: Option<Vec<u32>>,
}

impl QueryPlan {
    /// Resolve `request`. A non-empty `dataSchema` in the request overrides
    /// `table_schema`.
    pub fn build(request: &QueryRequest, table_schema: &Schema) -> QueryResult<Self> {
        let data_schema = if request.data_schema.trim().is_empty() {
            table_schema.clone()
        } else {
            Schema::parse(&request.data_schema)?
        };

        let projection = resolve_projection(&data_schema, &request.query_schema)?;
        let predicates = parse_predicates(&data_schema, &request.predicates)?;
        let group_by = data_schema.resolve(&request.group_by_cols)?;
        let order_by = parse_order_by(&data_schema, &request.order_by_cols)?;

        Ok(Self {
            data_schema,
            projection,
            predicates,
            group_by,
            order_by,
            row_numbers: request.row_numbers.clone(),
        })
    }

    pub fn has_aggregates(&self) -> bool {
        self.predicates.iter().any(|p| p.is_global_agg())
    }

    /// Nothing to do but copy the projected columns
    pub fn is_pure_projection(&self) -> bool {
        self.predicates.is_empty()
            && self.row_numbers.is_none()
            && self.group_by.is_empty()
            && self.order_by.is_empty()
    }

    /// Schema of the emitted rows.
    ///
    /// With aggregates the output is the group-by columns followed by one
    /// column per aggregate, named like `SUM(PRICE)`.
    pub fn output_schema(&self) -> QueryResult<Schema> {
        if !self.has_aggregates() {
            return Ok(self.projection.reindexed());
        }
        let mut cols: Vec<ColInfo> = self.group_by.columns().to_vec();
        for pred in self.predicates.iter().filter(|p| p.is_global_agg()) {
            let state = AggState::new(pred.op, pred.col_type)?;
            let target = if pred.is_rid() {
                RID_COL_NAME.to_string()
            } else {
                self.data_schema
                    .by_idx(pred.col_idx)
                    .map(|c| c.name.clone())
                    .unwrap_or_default()
            };
            let name = format!("{}({})", pred.op.as_str().to_uppercase(), target);
            cols.push(ColInfo::new(0, state.result_type(), false, true, name));
        }
        Ok(Schema::new(cols).reindexed())
    }

    /// Run the pipeline over `source`
    pub fn select<S: CellSource + ?Sized>(
        &self,
        source: &S,
        strategy: FilterStrategy,
        table_name: &str,
    ) -> QueryResult<Selection> {
        let nrows = source.num_rows();
        let candidates: Vec<usize> = match &self.row_numbers {
            Some(rows) => {
                let mut out = Vec::with_capacity(rows.len());
                for &rnum in rows {
                    let rnum = rnum as usize;
                    if rnum >= nrows {
                        return Err(QueryError::row_index_oob(rnum as u64, nrows as u64));
                    }
                    out.push(rnum);
                }
                out
            }
            None => (0..nrows).collect(),
        };
        let scanned_count = candidates.len();

        let mut live = Vec::with_capacity(candidates.len());
        for row in candidates {
            if !source.is_deleted(row)? {
                live.push(row);
            }
        }

        let passed = match strategy {
            FilterStrategy::RowWise => PredicateFilter::filter_rows(source, &live, &self.predicates)?,
            FilterStrategy::ColumnWise => {
                PredicateFilter::filter_columns(source, &live, &self.predicates)?
            }
        };

        let schema = self.output_schema()?;
        let mut warnings = Vec::new();
        let rows = if self.has_aggregates() {
            self.aggregate_rows(source, &passed)?
        } else {
            let mut groups = if self.group_by.is_empty() {
                passed
            } else {
                group_rows(source, &passed, self.group_by.columns())?
                    .into_iter()
                    .filter_map(|g| g.first().copied())
                    .collect()
            };
            ResultSorter::sort(source, &mut groups, &self.order_by)?;
            let mut rows = Vec::with_capacity(groups.len());
            for row in groups {
                rows.push(self.project(source, row, table_name, &mut warnings)?);
            }
            rows
        };

        Ok(Selection {
            schema,
            rows,
            warnings,
            scanned_count,
        })
    }

    /// One row per group (or one row overall): group-by cells of the
    /// group's first row, then the aggregate values
    fn aggregate_rows<S: CellSource + ?Sized>(
        &self,
        source: &S,
        passed: &[usize],
    ) -> QueryResult<Vec<OutputRow>> {
        let mut groups = if self.group_by.is_empty() {
            vec![passed.to_vec()]
        } else {
            group_rows(source, passed, self.group_by.columns())?
        };
        ResultSorter::sort_by_row(source, &mut groups, &self.order_by, |g| {
            g.first().copied().unwrap_or_default()
        })?;

        let mut rows = Vec::with_capacity(groups.len());
        for group in &groups {
            let mut values = Vec::with_capacity(self.group_by.len() + self.predicates.len());
            if let Some(&first) = group.first() {
                for col in self.group_by.iter() {
                    values.push(source.cell(first, col)?);
                }
            }
            let states = fold_aggregates(source, group, &self.predicates)?;
            values.extend(states.iter().map(AggState::finish));
            rows.push(OutputRow::new(-1, values));
        }
        Ok(rows)
    }

    /// Projected cells of one row.
    ///
    /// A projected index the data schema does not have is recorded in
    /// `warnings` and emitted as null.
    fn project<S: CellSource + ?Sized>(
        &self,
        source: &S,
        row: usize,
        table_name: &str,
        warnings: &mut Vec<QueryError>,
    ) -> QueryResult<OutputRow> {
        let rid = source.rid(row)?;
        let max_idx = self.data_schema.max_idx();
        let mut values = Vec::with_capacity(self.projection.len());

        for col in self.projection.iter() {
            let in_range = col.is_rid() || (col.idx >= 0 && col.idx <= max_idx);
            let cell = if in_range {
                source.cell(row, col)
            } else {
                Err(QueryError::new(QueryErrorCode::RequestedColIndexOOB, ""))
            };
            match cell {
                Ok(v) => values.push(v),
                Err(e) if e.code() == QueryErrorCode::RequestedColIndexOOB => {
                    warnings.push(QueryError::new(
                        QueryErrorCode::RequestedColIndexOOB,
                        format!("table={}; rid={} col.idx={} OOB.", table_name, rid, col.idx),
                    ));
                    values.push(Value::Null);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(OutputRow::new(rid, values))
    }
}

/// Projection text: `*` or empty for every column, schema text, or a comma
/// separated list of names
fn resolve_projection(data_schema: &Schema, text: &str) -> QueryResult<Schema> {
    let text = text.trim();
    if text.is_empty() || text == PROJECT_ALL {
        return Ok(data_schema.clone());
    }
    if text.contains(char::is_whitespace) {
        return Schema::parse(text);
    }
    data_schema.resolve(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;
    use crate::storage::{DataFormat, Record, RowTable};

    fn table() -> RowTable {
        let schema = Schema::parse("0 3 0 0 A;1 15 0 1 B").unwrap();
        let mut t = RowTable::new(&schema, "db", "t");
        for i in 0..4 {
            t.push_with_flag(
                Record::new(i, vec![Value::Int32(i as i32 % 2), Value::Str(format!("r{}", i))]),
                i == 2,
            );
        }
        t
    }

    fn plan(t: &RowTable, f: impl FnOnce(QueryRequest) -> QueryRequest) -> QueryPlan {
        let req = f(QueryRequest::new(DataFormat::RowFlex, Vec::new()));
        QueryPlan::build(&req, &t.schema().unwrap()).unwrap()
    }

    #[test]
    fn test_projection_forms() {
        let t = table();
        let schema = t.schema().unwrap();
        assert_eq!(resolve_projection(&schema, "*").unwrap(), schema);
        assert_eq!(resolve_projection(&schema, "B,A").unwrap().colnames(), vec!["B", "A"]);
        let parsed = resolve_projection(&schema, "1 15 0 1 B").unwrap();
        assert_eq!(parsed.columns()[0].idx, 1);
        assert!(resolve_projection(&schema, "C").is_err());
    }

    #[test]
    fn test_deleted_rows_skipped() {
        let t = table();
        let p = plan(&t, |r| r);
        let sel = p.select(&t, FilterStrategy::RowWise, "t").unwrap();
        let rids: Vec<i64> = sel.rows.iter().map(|r| r.rid).collect();
        assert_eq!(rids, vec![0, 1, 3]);
        assert_eq!(sel.scanned_count, 4);
    }

    #[test]
    fn test_explicit_rows_bounds_checked() {
        let t = table();
        let p = plan(&t, |r| r.with_rows(vec![1, 1000]));
        let err = p.select(&t, FilterStrategy::RowWise, "t").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::RowIndexOOB);
    }

    #[test]
    fn test_oob_projection_is_degraded() {
        let t = table();
        let p = plan(&t, |r| r.with_projection("0 3 0 0 A;7 3 0 0 Z"));
        let sel = p.select(&t, FilterStrategy::RowWise, "t").unwrap();
        assert_eq!(sel.rows.len(), 3);
        assert_eq!(sel.rows[0].values[1], Value::Null);
        assert_eq!(sel.warnings.len(), 3);
        assert!(sel.warnings[0].message().contains("col.idx=7 OOB."));
    }

    #[test]
    fn test_group_by_aggregates() {
        let t = table();
        let p = plan(&t, |r| r.with_predicates(";B,cnt,0;").with_group_by("A"));
        let schema = p.output_schema().unwrap();
        assert_eq!(schema.colnames(), vec!["A", "CNT(B)"]);
        assert_eq!(schema.columns()[1].col_type, ScalarType::UInt64);

        let sel = p.select(&t, FilterStrategy::RowWise, "t").unwrap();
        let rows: Vec<_> = sel.rows.iter().map(|r| r.values.clone()).collect();
        assert_eq!(
            rows,
            vec![
                vec![Value::Int32(0), Value::UInt64(1)],
                vec![Value::Int32(1), Value::UInt64(2)],
            ]
        );
        assert!(sel.rows.iter().all(|r| r.rid == -1));
    }

    #[test]
    fn test_global_aggregate_single_row() {
        let t = table();
        let p = plan(&t, |r| r.with_predicates(";A,eq,1;A,sum,0;RID,max,0;"));
        let sel = p.select(&t, FilterStrategy::ColumnWise, "t").unwrap();
        assert_eq!(sel.rows.len(), 1);
        assert_eq!(sel.rows[0].values, vec![Value::Int64(2), Value::UInt64(3)]);
        assert_eq!(sel.schema.colnames(), vec!["SUM(A)", "MAX(RID)"]);
    }
}
