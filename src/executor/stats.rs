//! Column histograms over row-format tables
//!
//! `[min, max]` is cut into `bucket_count` equal-width buckets. Every bucket
//! is half open except the last, which also takes `max`. Values outside the
//! range, null cells and tombstoned rows are not counted. With a sampling
//! rate below one only every `floor(1 / sampling)`-th row is visited.

use serde::{Deserialize, Serialize};

use super::result::ExecutionResult;
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{ColInfo, Domain, ScalarType, Schema, Value};
use crate::storage::{DataFormat, Record, RowTable};

pub const BUCKET_MIN_COL: &str = "BUCKET_MIN";
pub const BUCKET_MAX_COL: &str = "BUCKET_MAX";
pub const BUCKET_COUNT_COL: &str = "COUNT";

/// Rid carried by every histogram row
const BUCKET_RID: i64 = -1;

/// One histogram over one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    pub col_name: String,
    pub bucket_count: u32,
    pub min_val: f64,
    pub max_val: f64,
    /// Fraction of rows visited, in `(0, 1]`
    #[serde(default = "default_sampling")]
    pub sampling: f64,
}

fn default_sampling() -> f64 {
    1.0
}

impl StatsRequest {
    /// Every row visited
    pub fn new(col_name: impl Into<String>, bucket_count: u32, min_val: f64, max_val: f64) -> Self {
        Self {
            col_name: col_name.into(),
            bucket_count,
            min_val,
            max_val,
            sampling: default_sampling(),
        }
    }

    pub fn with_sampling(mut self, sampling: f64) -> Self {
        self.sampling = sampling;
        self
    }

    fn validate(&self) -> QueryResult<()> {
        if self.bucket_count == 0 {
            return Err(bad_argument("bucket count must be positive".to_string()));
        }
        if !self.min_val.is_finite() || !self.max_val.is_finite() || self.min_val >= self.max_val {
            return Err(bad_argument(format!(
                "histogram range [{}, {}] is empty",
                self.min_val, self.max_val
            )));
        }
        if !(self.sampling > 0.0 && self.sampling <= 1.0) {
            return Err(bad_argument(format!(
                "sampling {} not in (0, 1]",
                self.sampling
            )));
        }
        Ok(())
    }

    /// Row step implied by the sampling rate
    pub fn increment(&self) -> usize {
        ((1.0 / self.sampling) as usize).max(1)
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        let n = self.bucket_count as usize;
        let width = (self.max_val - self.min_val) / n as f64;
        let lower = |i: usize| self.min_val + width * i as f64;
        (0..n)
            .map(|i| {
                let upper = if i + 1 == n { self.max_val } else { lower(i + 1) };
                (lower(i), upper)
            })
            .collect()
    }
}

fn bad_argument(message: String) -> QueryError {
    QueryError::new(QueryErrorCode::BadStatsArgument, message)
}

/// One histogram bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub freq: u32,
}

/// Count the sampled values of `stats.col_name` per bucket.
///
/// Buckets come out in ascending order, empty ones included.
pub fn histogram(table: &RowTable, stats: &StatsRequest) -> QueryResult<Vec<Bucket>> {
    stats.validate()?;
    let col = table.schema()?.find(&stats.col_name)?;
    if !matches!(
        col.col_type.domain(),
        Domain::Signed | Domain::Unsigned | Domain::Float
    ) {
        return Err(QueryError::new(
            QueryErrorCode::UnsupportedSkyDataType,
            format!("no histogram over {} column {}", col.col_type, col.name),
        ));
    }

    let mut buckets: Vec<Bucket> = stats
        .bounds()
        .into_iter()
        .map(|(lower, upper)| Bucket { lower, upper, freq: 0 })
        .collect();

    for rnum in (0..table.nrows()).step_by(stats.increment()) {
        if table.is_deleted(rnum) {
            continue;
        }
        let cell = table.rows[rnum].cell(&col)?;
        let Some(val) = numeric(&cell) else {
            continue;
        };
        if val < stats.min_val || val > stats.max_val {
            continue;
        }
        // last bucket whose lower bound is <= val
        let idx = buckets.partition_point(|b| b.lower <= val).saturating_sub(1);
        buckets[idx].freq += 1;
    }
    Ok(buckets)
}

fn numeric(cell: &Value) -> Option<f64> {
    cell.as_f64()
        .or_else(|| cell.as_i64().map(|v| v as f64))
        .or_else(|| cell.as_u64().map(|v| v as f64))
}

/// Output schema of a histogram table
pub fn stats_schema() -> Schema {
    Schema::new(vec![
        ColInfo::new(0, ScalarType::Double, true, false, BUCKET_MIN_COL),
        ColInfo::new(1, ScalarType::Double, true, false, BUCKET_MAX_COL),
        ColInfo::new(2, ScalarType::Int32, false, false, BUCKET_COUNT_COL),
    ])
}

/// Histogram of a decoded row table, encoded as a row table
pub fn process_stats(table: &RowTable, stats: &StatsRequest) -> QueryResult<ExecutionResult> {
    let buckets = histogram(table, stats)?;

    let mut meta = table.meta.derive(&stats_schema(), 0);
    meta.data_format_type = DataFormat::RowFlex.code();
    let mut out = RowTable::with_meta(meta);
    for bucket in &buckets {
        out.push(Record::new(
            BUCKET_RID,
            vec![
                Value::Double(bucket.lower),
                Value::Double(bucket.upper),
                Value::Int32(i32::try_from(bucket.freq).unwrap_or(i32::MAX)),
            ],
        ));
    }

    Ok(ExecutionResult {
        output_bytes: out.serialize(),
        warnings: Vec::new(),
        scanned_count: table.nrows().div_ceil(stats.increment()),
        returned_count: buckets.len(),
    })
}

/// Decode a row buffer and build the histogram
pub fn process_stats_bytes(input: &[u8], stats: &StatsRequest) -> QueryResult<ExecutionResult> {
    let table = RowTable::deserialize(input)?;
    process_stats(&table, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(values: &[Option<f64>], deleted: &[usize]) -> RowTable {
        let schema = Schema::parse("0 3 0 0 ID;1 13 0 1 TEMP;2 15 0 0 NOTE").unwrap();
        let mut t = RowTable::new(&schema, "lab", "readings");
        for (i, v) in values.iter().enumerate() {
            t.push_with_flag(
                Record::new(
                    i as i64,
                    vec![
                        Value::Int32(i as i32),
                        v.map(Value::Double).unwrap_or(Value::Null),
                        Value::Str(format!("n{}", i)),
                    ],
                ),
                deleted.contains(&i),
            );
        }
        t
    }

    fn freqs(buckets: &[Bucket]) -> Vec<u32> {
        buckets.iter().map(|b| b.freq).collect()
    }

    #[test]
    fn test_bucket_bounds() {
        let t = readings(&[], &[]);
        let buckets = histogram(&t, &StatsRequest::new("TEMP", 4, 0.0, 10.0)).unwrap();
        let bounds: Vec<(f64, f64)> = buckets.iter().map(|b| (b.lower, b.upper)).collect();
        assert_eq!(bounds, vec![(0.0, 2.5), (2.5, 5.0), (5.0, 7.5), (7.5, 10.0)]);
    }

    #[test]
    fn test_empty_table_has_zero_buckets() {
        let t = readings(&[], &[]);
        let result = process_stats(&t, &StatsRequest::new("TEMP", 3, 0.0, 3.0)).unwrap();
        let out = RowTable::deserialize(&result.output_bytes).unwrap();
        assert_eq!(out.nrows(), 3);
        assert!(out.rows.iter().all(|r| r.values[2] == Value::Int32(0)));
        assert_eq!(result.scanned_count, 0);
    }

    #[test]
    fn test_edges_go_to_upper_bucket_and_max_is_kept() {
        let t = readings(&[Some(0.0), Some(2.5), Some(4.99), Some(5.0), Some(10.0)], &[]);
        let buckets = histogram(&t, &StatsRequest::new("TEMP", 4, 0.0, 10.0)).unwrap();
        assert_eq!(freqs(&buckets), vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_out_of_range_null_and_deleted_not_counted() {
        let t = readings(&[Some(-0.5), Some(10.5), None, Some(3.0), Some(3.0)], &[4]);
        let buckets = histogram(&t, &StatsRequest::new("TEMP", 2, 0.0, 10.0)).unwrap();
        assert_eq!(freqs(&buckets), vec![1, 0]);
    }

    #[test]
    fn test_integer_column_and_sampling() {
        let t = readings(&[Some(0.0); 6], &[]);
        let stats = StatsRequest::new("ID", 3, 0.0, 6.0).with_sampling(0.5);
        assert_eq!(stats.increment(), 2);
        // rows 0, 2, 4
        assert_eq!(freqs(&histogram(&t, &stats).unwrap()), vec![1, 1, 1]);
    }

    #[test]
    fn test_bad_arguments() {
        let t = readings(&[Some(1.0)], &[]);
        let code = |s: StatsRequest| histogram(&t, &s).unwrap_err().code();
        assert_eq!(code(StatsRequest::new("TEMP", 0, 0.0, 1.0)), QueryErrorCode::BadStatsArgument);
        assert_eq!(code(StatsRequest::new("TEMP", 2, 1.0, 1.0)), QueryErrorCode::BadStatsArgument);
        assert_eq!(
            code(StatsRequest::new("TEMP", 2, 0.0, 1.0).with_sampling(0.0)),
            QueryErrorCode::BadStatsArgument
        );
        assert_eq!(code(StatsRequest::new("NOTE", 2, 0.0, 1.0)), QueryErrorCode::UnsupportedSkyDataType);
        assert_eq!(code(StatsRequest::new("NOPE", 2, 0.0, 1.0)), QueryErrorCode::RequestedColNotPresent);
    }

    #[test]
    fn test_encoded_table() {
        let t = readings(&[Some(1.0), Some(6.0)], &[]);
        let result = process_stats(&t, &StatsRequest::new("TEMP", 2, 0.0, 10.0)).unwrap();
        let out = RowTable::deserialize(&result.output_bytes).unwrap();

        assert_eq!(out.schema().unwrap(), stats_schema());
        assert_eq!(out.meta.table_name, "readings");
        assert_eq!(
            out.rows[1].values,
            vec![Value::Double(5.0), Value::Double(10.0), Value::Int32(1)]
        );
        assert!(out.rows.iter().all(|r| r.rid == -1));
        assert_eq!(result.returned_count, 2);
    }
}
