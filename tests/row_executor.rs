//! Row Executor Tests
//!
//! End-to-end queries over ROW_FLEX buffers through the public executor:
//! - Row counts follow predicates and tombstones
//! - Full projection reproduces the input
//! - Group-by collapses duplicate keys
//! - Order-by breaks ties on later keys
//! - Row numbers past the table are fatal and emit nothing

use skyquery::errors::QueryErrorCode;
use skyquery::executor::{QueryExecutor, QueryRequest};
use skyquery::schema::{Schema, Value};
use skyquery::storage::{DataFormat, Record, RowTable};

// =============================================================================
// Test Utilities
// =============================================================================

fn people_table() -> RowTable {
    let schema = Schema::parse("0 3 0 0 AGE;1 9 0 0 CLASS;2 15 0 1 NAME").unwrap();
    let mut table = RowTable::new(&schema, "school", "people");
    let rows = [
        (34, b'Q', "ann", false),
        (12, b'V', "bob", false),
        (34, b'Q', "cat", false),
        (51, b'Z', "dan", true),
        (8, b'V', "eve", false),
    ];
    for (i, (age, class, name, deleted)) in rows.iter().enumerate() {
        table.push_with_flag(
            Record::new(
                i as i64,
                vec![
                    Value::Int32(*age),
                    Value::Char(*class as i8),
                    Value::Str(name.to_string()),
                ],
            ),
            *deleted,
        );
    }
    table
}

fn request(table: &RowTable) -> QueryRequest {
    QueryRequest::new(DataFormat::RowFlex, table.serialize())
}

fn execute(req: &QueryRequest) -> (i32, RowTable) {
    let response = QueryExecutor::new().execute(req);
    let output = RowTable::deserialize(&response.output_bytes).unwrap();
    (response.error_code, output)
}

fn rids(table: &RowTable) -> Vec<i64> {
    table.rows.iter().map(|r| r.rid).collect()
}

// =============================================================================
// Row Counts
// =============================================================================

#[test]
fn test_row_count_matches_passing_live_rows() {
    let table = people_table();
    let (code, out) = execute(&request(&table).with_predicates(";AGE,gt,10;"));

    assert_eq!(code, 0);
    // dan passes the predicate but is tombstoned
    assert_eq!(rids(&out), vec![0, 1, 2]);
}

#[test]
fn test_deleted_rows_never_returned() {
    let table = people_table();
    let (_, out) = execute(&request(&table).with_predicates(";NAME,like,^d;"));
    assert_eq!(out.nrows(), 0);

    let (_, out) = execute(&request(&table).with_rows(vec![3, 4]));
    assert_eq!(rids(&out), vec![4]);
}

#[test]
fn test_aggregate_adds_single_row() {
    let table = people_table();
    let (code, out) = execute(&request(&table).with_predicates(";CLASS,eq,V;AGE,sum,0;AGE,cnt,0;"));

    assert_eq!(code, 0);
    assert_eq!(out.nrows(), 1);
    assert_eq!(out.rows[0].values, vec![Value::Int64(20), Value::UInt64(2)]);
    assert_eq!(out.schema().unwrap().colnames(), vec!["SUM(AGE)", "CNT(AGE)"]);
}

// =============================================================================
// Projection
// =============================================================================

#[test]
fn test_full_projection_round_trip() {
    let mut table = people_table();
    table.delete_vector = vec![0; table.nrows()];

    let (code, out) = execute(&request(&table));
    assert_eq!(code, 0);
    assert_eq!(out.rows, table.rows);
    assert_eq!(out.schema().unwrap(), table.schema().unwrap());
}

#[test]
fn test_projection_with_rid_column() {
    let table = people_table();
    let (_, out) = execute(&request(&table).with_projection("RID,NAME").with_rows(vec![2]));

    assert_eq!(
        out.rows[0].values,
        vec![Value::UInt64(2), Value::Str("cat".to_string())]
    );
}

#[test]
fn test_out_of_range_projection_degrades() {
    let table = people_table();
    let response = QueryExecutor::new()
        .execute(&request(&table).with_projection("2 15 0 1 NAME;7 3 0 0 GHOST"));

    assert_eq!(response.error_code, QueryErrorCode::RequestedColIndexOOB.number());
    assert!(response.error_message.contains("table=people; rid=0 col.idx=7 OOB."));

    let out = RowTable::deserialize(&response.output_bytes).unwrap();
    assert_eq!(out.nrows(), 4);
    assert!(out.rows.iter().all(|r| r.values[1] == Value::Null));
}

// =============================================================================
// Group-by and Order-by
// =============================================================================

#[test]
fn test_group_by_distinct() {
    let schema = Schema::parse("0 3 0 0 AGE;1 9 0 0 CLASS").unwrap();
    let mut table = RowTable::new(&schema, "", "");
    for (i, (age, class)) in [(34, b'Q'), (12, b'V'), (34, b'Q')].iter().enumerate() {
        table.push(Record::new(
            i as i64,
            vec![Value::Int32(*age), Value::Char(*class as i8)],
        ));
    }

    let (code, out) = execute(&request(&table).with_group_by("AGE,CLASS"));
    assert_eq!(code, 0);
    assert_eq!(out.nrows(), 2);
}

#[test]
fn test_order_by_secondary_key() {
    let schema = Schema::parse("0 3 0 0 K;1 15 0 0 S").unwrap();
    let mut table = RowTable::new(&schema, "", "");
    table.push(Record::new(0, vec![Value::Int32(5), Value::Str("b".to_string())]));
    table.push(Record::new(1, vec![Value::Int32(5), Value::Str("a".to_string())]));

    let (_, out) = execute(&request(&table).with_order_by(";K,ASC;S,ASC;"));
    let values: Vec<_> = out.rows.iter().map(|r| r.values.clone()).collect();
    assert_eq!(
        values,
        vec![
            vec![Value::Int32(5), Value::Str("a".to_string())],
            vec![Value::Int32(5), Value::Str("b".to_string())],
        ]
    );
}

#[test]
fn test_group_by_then_order_desc() {
    let table = people_table();
    let (_, out) = execute(
        &request(&table)
            .with_projection("CLASS")
            .with_group_by("CLASS")
            .with_order_by(";CLASS,DESC;"),
    );
    let classes: Vec<_> = out.rows.iter().map(|r| r.values[0].clone()).collect();
    assert_eq!(
        classes,
        vec![Value::Char(b'V' as i8), Value::Char(b'Q' as i8)]
    );
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[test]
fn test_row_number_out_of_range_is_fatal() {
    let schema = Schema::parse("0 3 0 0 A").unwrap();
    let mut table = RowTable::new(&schema, "", "");
    for i in 0..10 {
        table.push(Record::new(i, vec![Value::Int32(i as i32)]));
    }

    let (code, out) = execute(&request(&table).with_rows(vec![1000]));
    assert_eq!(code, QueryErrorCode::RowIndexOOB.number());
    assert_eq!(out.nrows(), 0);
}

#[test]
fn test_corrupt_input_is_fatal() {
    let table = people_table();
    let mut bytes = table.serialize();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;

    let (code, out) = execute(&QueryRequest::new(DataFormat::RowFlex, bytes));
    assert_eq!(code, QueryErrorCode::DataCorruption.number());
    assert_eq!(out.nrows(), 0);
}

#[test]
fn test_unknown_column_rejected() {
    let table = people_table();
    let (code, _) = execute(&request(&table).with_predicates(";HEIGHT,gt,3;"));
    assert_eq!(code, QueryErrorCode::RequestedColNotPresent.number());
}
