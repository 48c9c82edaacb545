//! Schema text model
//!
//! Text form: one descriptor per `;` segment (or per line when no `;` is
//! present), each `idx type is_key nullable name`:
//!
//! ```text
//! 0 8 1 0 ORDERKEY
//! 1 13 0 1 EXTENDEDPRICE
//! 2 15 0 1 COMMENT
//! ```

use std::collections::HashSet;
use std::fmt;

use super::types::{ColInfo, ScalarType, NUM_COL_INFO_FIELDS, RID_COL_NAME};
use crate::errors::{QueryError, QueryResult};

/// Projection wildcard
pub const PROJECT_ALL: &str = "*";

/// Ordered list of column descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    cols: Vec<ColInfo>,
}

impl Schema {
    pub fn new(cols: Vec<ColInfo>) -> Self {
        Self { cols }
    }

    /// Parse schema text.
    ///
    /// Segments shorter than the minimal `a b c d e` form are skipped, every
    /// other segment must carry exactly five fields.
    pub fn parse(text: &str) -> QueryResult<Self> {
        let segments: Vec<&str> = if text.contains(';') {
            text.split(';').collect()
        } else if text.contains('\n') {
            text.split('\n').collect()
        } else {
            vec![text]
        };

        let min_len = 2 * NUM_COL_INFO_FIELDS - 1;
        let mut cols = Vec::new();
        let mut seen = HashSet::new();

        for segment in segments {
            let segment = segment.trim();
            if segment.len() < min_len {
                continue;
            }
            let ci = parse_col_info(segment)?;
            if !seen.insert(ci.idx) {
                return Err(QueryError::bad_col_info(format!(
                    "{} (duplicate idx {})",
                    segment, ci.idx
                )));
            }
            cols.push(ci);
        }

        Ok(Self { cols })
    }

    /// Select descriptors by name, in the requested order.
    ///
    /// `*` yields the whole schema and `RID` (or an empty list) the row-id
    /// descriptor. Unknown names are skipped, so callers must check the
    /// result against what they asked for.
    pub fn from_col_names(&self, col_names: &str) -> Schema {
        let col_names = col_names.trim();
        if col_names == PROJECT_ALL {
            return self.clone();
        }
        if col_names.is_empty() || col_names == RID_COL_NAME {
            return Schema::new(vec![ColInfo::rid()]);
        }

        let mut cols = Vec::new();
        for name in col_names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            cols.extend(self.cols.iter().filter(|c| c.compare_name(name)).cloned());
        }
        Schema::new(cols)
    }

    /// Resolve a single column name, `RID` included
    pub fn find(&self, name: &str) -> QueryResult<ColInfo> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::col_not_present(name));
        }
        self.from_col_names(name)
            .cols
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::col_not_present(name))
    }

    /// Resolve a comma separated name list, failing on any missing name
    pub fn resolve(&self, col_names: &str) -> QueryResult<Schema> {
        let trimmed = col_names.trim();
        if trimmed == PROJECT_ALL {
            return Ok(self.clone());
        }
        let mut cols = Vec::new();
        for name in trimmed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            cols.push(self.find(name)?);
        }
        Ok(Schema::new(cols))
    }

    pub fn colnames(&self) -> Vec<String> {
        self.cols.iter().map(|c| c.name.clone()).collect()
    }

    /// Largest stored column index, -1 for an empty schema
    pub fn max_idx(&self) -> i32 {
        self.cols.iter().map(|c| c.idx).max().unwrap_or(-1)
    }

    pub fn by_idx(&self, idx: i32) -> Option<&ColInfo> {
        self.cols.iter().find(|c| c.idx == idx)
    }

    /// Copy with indices renumbered to storage positions `0..n`
    pub fn reindexed(&self) -> Schema {
        let cols = self
            .cols
            .iter()
            .enumerate()
            .map(|(pos, c)| ColInfo {
                idx: pos as i32,
                ..c.clone()
            })
            .collect();
        Schema::new(cols)
    }

    pub fn columns(&self) -> &[ColInfo] {
        &self.cols
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColInfo> {
        self.cols.iter()
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for col in &self.cols {
            writeln!(f, "{}", col)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a ColInfo;
    type IntoIter = std::slice::Iter<'a, ColInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cols.iter()
    }
}

fn parse_col_info(segment: &str) -> QueryResult<ColInfo> {
    let fields: Vec<&str> = segment.split(' ').filter(|f| !f.is_empty()).collect();
    if fields.len() != NUM_COL_INFO_FIELDS {
        return Err(QueryError::bad_col_info(segment));
    }

    let idx: i32 = fields[0]
        .parse()
        .map_err(|_| QueryError::bad_col_info(segment))?;
    let col_type = fields[1]
        .parse::<i32>()
        .ok()
        .and_then(ScalarType::from_code)
        .ok_or_else(|| QueryError::bad_col_info(segment))?;
    let is_key = parse_flag(fields[2]).ok_or_else(|| QueryError::bad_col_info(segment))?;
    let nullable = parse_flag(fields[3]).ok_or_else(|| QueryError::bad_col_info(segment))?;

    Ok(ColInfo::new(idx, col_type, is_key, nullable, fields[4].trim()))
}

fn parse_flag(field: &str) -> Option<bool> {
    match field {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryErrorCode;

    const LINEITEM: &str = "0 4 1 0 ORDERKEY; 1 3 0 1 LINENUMBER; 2 13 0 1 EXTENDEDPRICE; \
                            3 14 0 1 SHIPDATE; 4 15 0 1 COMMENT";

    #[test]
    fn test_parse_semicolon_segments() {
        let schema = Schema::parse(LINEITEM).unwrap();
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.columns()[2].col_type, ScalarType::Double);
        assert!(schema.columns()[0].is_key);
        assert_eq!(schema.max_idx(), 4);
    }

    #[test]
    fn test_parse_newline_segments_and_round_trip() {
        let text = "0 4 1 0 ORDERKEY\n1   15 0 1 COMMENT\n";
        let schema = Schema::parse(text).unwrap();
        assert_eq!(schema.to_string(), "0 4 1 0 ORDERKEY\n1 15 0 1 COMMENT\n");
        assert_eq!(Schema::parse(&schema.to_string()).unwrap(), schema);
    }

    #[test]
    fn test_parse_single_segment() {
        let schema = Schema::parse("0 11 0 0 FLAG").unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_parse_skips_short_segments() {
        let schema = Schema::parse("0 4 1 0 A;;  ;1 4 0 0 B;").unwrap();
        assert_eq!(schema.colnames(), vec!["A", "B"]);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = Schema::parse("0 4 1 0 ORDER KEY").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::BadColInfoFormat);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(Schema::parse("0 99 1 0 ORDERKEY").is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_idx() {
        assert!(Schema::parse("0 4 1 0 A;0 4 0 0 B").is_err());
    }

    #[test]
    fn test_from_col_names_keeps_request_order() {
        let schema = Schema::parse(LINEITEM).unwrap();
        let q = schema.from_col_names("COMMENT,ORDERKEY");
        assert_eq!(q.colnames(), vec!["COMMENT", "ORDERKEY"]);
        assert_eq!(q.columns()[0].idx, 4);
    }

    #[test]
    fn test_from_col_names_special_forms() {
        let schema = Schema::parse(LINEITEM).unwrap();
        assert_eq!(schema.from_col_names("*"), schema);
        assert_eq!(schema.from_col_names("RID").columns(), &[ColInfo::rid()]);
        assert_eq!(schema.from_col_names("").columns(), &[ColInfo::rid()]);
        assert!(schema.from_col_names("NOPE").is_empty());
    }

    #[test]
    fn test_resolve_reports_missing() {
        let schema = Schema::parse(LINEITEM).unwrap();
        let err = schema.resolve("ORDERKEY,NOPE").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::RequestedColNotPresent);
    }

    #[test]
    fn test_reindexed() {
        let schema = Schema::parse(LINEITEM).unwrap();
        let q = schema.from_col_names("COMMENT,ORDERKEY").reindexed();
        assert_eq!(q.columns()[0].idx, 0);
        assert_eq!(q.columns()[1].idx, 1);
        assert_eq!(q.columns()[1].name, "ORDERKEY");
    }
}
