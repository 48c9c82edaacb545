//! Result ordering
//!
//! Order-by text is `;col,ASC|DESC;col,ASC|DESC;`. Rows are sorted by a
//! stable composite comparator: each key is compared in turn and the first
//! one that differs decides.

use std::cmp::Ordering;

use super::source::CellSource;
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::predicate::{PRED_DELIM_INNER, PRED_DELIM_OUTER};
use crate::schema::{ColInfo, Schema, Value};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub col: ColInfo,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(col: ColInfo) -> Self {
        Self {
            col,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(col: ColInfo) -> Self {
        Self {
            col,
            direction: SortDirection::Desc,
        }
    }
}

/// Parse order-by text against the data schema.
///
/// Column names are upper-cased before lookup. A direction other than
/// ASC or DESC is `BadOrderBy`.
pub fn parse_order_by(schema: &Schema, text: &str) -> QueryResult<Vec<SortSpec>> {
    let mut specs = Vec::new();
    for item in text
        .split(PRED_DELIM_OUTER)
        .map(str::trim)
        .filter(|i| !i.is_empty())
    {
        let (name, direction) = item.split_once(PRED_DELIM_INNER).ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::BadOrderBy,
                format!("order-by item '{}' is not col,ASC|DESC", item),
            )
        })?;
        let col = schema.find(&name.trim().to_uppercase())?;
        let spec = match direction.trim().to_uppercase().as_str() {
            "ASC" => SortSpec::asc(col),
            "DESC" => SortSpec::desc(col),
            other => {
                return Err(QueryError::new(
                    QueryErrorCode::BadOrderBy,
                    format!("unsupported sort direction '{}'", other),
                ))
            }
        };
        specs.push(spec);
    }
    Ok(specs)
}

/// Sorts row numbers by cell values
pub struct ResultSorter;

impl ResultSorter {
    /// Stable sort of `items` keyed by the row each one maps to.
    ///
    /// Sort keys are read once per item before sorting.
    pub fn sort_by_row<T, S, F>(
        source: &S,
        items: &mut Vec<T>,
        specs: &[SortSpec],
        row_of: F,
    ) -> QueryResult<()>
    where
        S: CellSource + ?Sized,
        F: Fn(&T) -> usize,
    {
        if specs.is_empty() || items.len() < 2 {
            return Ok(());
        }

        let mut keyed = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            let row = row_of(&item);
            let keys = specs
                .iter()
                .map(|s| source.cell(row, &s.col))
                .collect::<QueryResult<Vec<_>>>()?;
            keyed.push((keys, item));
        }

        keyed.sort_by(|(a, _), (b, _)| Self::compare_keys(a, b, specs));
        items.extend(keyed.into_iter().map(|(_, item)| item));
        Ok(())
    }

    /// Stable sort of plain row numbers
    pub fn sort<S: CellSource + ?Sized>(
        source: &S,
        rows: &mut Vec<usize>,
        specs: &[SortSpec],
    ) -> QueryResult<()> {
        Self::sort_by_row(source, rows, specs, |r| *r)
    }

    fn compare_keys(a: &[Value], b: &[Value], specs: &[SortSpec]) -> Ordering {
        for ((x, y), spec) in a.iter().zip(b).zip(specs) {
            let ordering = match spec.direction {
                SortDirection::Asc => x.sort_cmp(y),
                SortDirection::Desc => y.sort_cmp(x),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
