//! Query over row-format tables
//!
//! Predicates run row-wise. The output is a row table holding the selected
//! rows projected onto the output schema, carrying the input's database and
//! table names.

use super::plan::{FilterStrategy, QueryPlan};
use super::request::QueryRequest;
use super::result::{ExecutionResult, Selection};
use crate::errors::QueryResult;
use crate::storage::{DataFormat, JsonTable, Record, RowTable, TableMeta};

/// Run `request` over a decoded row table
pub fn process_row_table(table: &RowTable, request: &QueryRequest) -> QueryResult<ExecutionResult> {
    let plan = QueryPlan::build(request, &table.schema()?)?;
    let selection = plan.select(table, FilterStrategy::RowWise, &table.meta.table_name)?;
    Ok(encode_selection(&table.meta, selection))
}

/// Decode a row buffer and run `request` over it
pub fn process_row_bytes(request: &QueryRequest) -> QueryResult<ExecutionResult> {
    let table = RowTable::deserialize(&request.input_bytes)?;
    process_row_table(&table, request)
}

/// Run `request` over a JSON table; the output is a row table
pub fn process_json(request: &QueryRequest) -> QueryResult<ExecutionResult> {
    let table = JsonTable::from_slice(&request.input_bytes)?.into_row_table()?;
    process_row_table(&table, request)
}

fn encode_selection(source_meta: &TableMeta, selection: Selection) -> ExecutionResult {
    let mut meta = source_meta.derive(&selection.schema, 0);
    meta.data_format_type = DataFormat::RowFlex.code();

    let returned_count = selection.rows.len();
    let mut out = RowTable::with_meta(meta);
    for row in selection.rows {
        out.push(Record::new(row.rid, row.values));
    }

    ExecutionResult {
        output_bytes: out.serialize(),
        warnings: selection.warnings,
        scanned_count: selection.scanned_count,
        returned_count,
    }
}

/// Valid, empty row table; the body of a failed response
pub fn empty_row_output() -> Vec<u8> {
    RowTable::new(&Default::default(), "", "").serialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryErrorCode;
    use crate::schema::{Schema, Value};

    fn people() -> RowTable {
        let schema = Schema::parse("0 3 1 0 AGE;1 9 0 0 CLASS;2 15 0 1 NAME").unwrap();
        let mut t = RowTable::new(&schema, "db", "people");
        let rows = [(34, b'Q', "ann"), (12, b'V', "bob"), (34, b'Q', "cat")];
        for (i, (age, class, name)) in rows.iter().enumerate() {
            t.push(Record::new(
                i as i64,
                vec![
                    Value::Int32(*age),
                    Value::Char(*class as i8),
                    Value::Str(name.to_string()),
                ],
            ));
        }
        t
    }

    fn run(req: QueryRequest) -> RowTable {
        let result = process_row_table(&people(), &req).unwrap();
        RowTable::deserialize(&result.output_bytes).unwrap()
    }

    fn base() -> QueryRequest {
        QueryRequest::new(DataFormat::RowFlex, Vec::new())
    }

    #[test]
    fn test_select_all_preserves_rows() {
        let out = run(base());
        assert_eq!(out.nrows(), 3);
        assert_eq!(out.meta.table_name, "people");
        assert_eq!(out.rows, people().rows);
    }

    #[test]
    fn test_projection_schema_reindexed() {
        let out = run(base().with_projection("NAME,AGE"));
        assert_eq!(
            out.schema().unwrap(),
            Schema::parse("0 15 0 1 NAME;1 3 1 0 AGE").unwrap()
        );
        assert_eq!(
            out.rows[1].values,
            vec![Value::Str("bob".to_string()), Value::Int32(12)]
        );
    }

    #[test]
    fn test_distinct_via_group_by() {
        let out = run(base().with_projection("AGE,CLASS").with_group_by("AGE,CLASS"));
        assert_eq!(out.nrows(), 2);
    }

    #[test]
    fn test_filter_and_order() {
        let out = run(
            base()
                .with_predicates(";AGE,eq,34;")
                .with_order_by(";NAME,DESC;"),
        );
        let rids: Vec<i64> = out.rows.iter().map(|r| r.rid).collect();
        assert_eq!(rids, vec![2, 0]);
    }

    #[test]
    fn test_row_oob_is_fatal() {
        let err = process_row_table(&people(), &base().with_rows(vec![1000])).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::RowIndexOOB);
    }

    #[test]
    fn test_json_input() {
        let json = br#"{"schema":"0 3 0 0 A;1 15 0 1 S","rows":[[1,"x"],[2,null],[3,"z"]],"deleted":[0,0,1]}"#;
        let req = QueryRequest::new(DataFormat::Json, json.to_vec()).with_predicates(";A,gt,1;");
        let result = process_json(&req).unwrap();
        let out = RowTable::deserialize(&result.output_bytes).unwrap();
        assert_eq!(out.nrows(), 1);
        assert_eq!(out.rows[0].values, vec![Value::Int32(2), Value::Null]);
        assert_eq!(result.scanned_count, 3);
    }

    #[test]
    fn test_empty_output_decodes() {
        let out = RowTable::deserialize(&empty_row_output()).unwrap();
        assert_eq!(out.nrows(), 0);
    }
}
