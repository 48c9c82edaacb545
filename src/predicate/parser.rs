//! Predicate text grammar
//!
//! ```text
//! ;orderkey,eq,5;comment,like,hello world;extendedprice,gt,2.01,logical_or;
//! ```
//!
//! Items are `col,op,value` with an optional trailing chain operator.
//! Column names are matched upper-cased.

use super::ops::Op;
use super::predicate::{literal_to_string, parse_literal, Predicate};
use crate::errors::{QueryError, QueryErrorCode, QueryResult};
use crate::schema::{Schema, RID_COL_NAME};

/// Item separator
pub const PRED_DELIM_OUTER: char = ';';
/// Field separator within an item
pub const PRED_DELIM_INNER: char = ',';
/// Predicate text meaning "no predicates"
pub const SELECT_ALL: &str = "*";

/// Parse predicate text against a schema.
///
/// Aggregate predicates are moved behind the filtering ones, keeping parse
/// order within each group.
pub fn parse_predicates(schema: &Schema, text: &str) -> QueryResult<Vec<Predicate>> {
    let text = text.trim().trim_matches(PRED_DELIM_OUTER);
    if text.is_empty() || text == SELECT_ALL {
        return Ok(Vec::new());
    }

    let mut preds = Vec::new();
    let mut agg_preds = Vec::new();

    for item in text.split(PRED_DELIM_OUTER).filter(|i| !i.trim().is_empty()) {
        let pred = parse_item(schema, item)?;
        if pred.is_global_agg() {
            agg_preds.push(pred);
        } else {
            preds.push(pred);
        }
    }

    preds.extend(agg_preds);
    Ok(preds)
}

fn parse_item(schema: &Schema, item: &str) -> QueryResult<Predicate> {
    let fields: Vec<&str> = item.split(PRED_DELIM_INNER).collect();
    if fields.len() < 3 {
        return Err(QueryError::new(
            QueryErrorCode::BadPredicateLiteral,
            format!("predicate '{}' is not col,op,value", item),
        ));
    }

    let colname = fields[0].trim().to_uppercase();
    let op: Op = fields[1].parse()?;

    // a trailing chain operator is only taken when it names one
    let (value_fields, chain) = match fields.last().map(|f| f.trim().parse::<Op>()) {
        Some(Ok(chain)) if fields.len() >= 4 && chain.is_chain() => {
            (&fields[2..fields.len() - 1], Some(chain))
        }
        _ => (&fields[2..], None),
    };
    let value = value_fields.join(",");

    let col = schema.find(&colname)?;
    let literal = if op.is_agg() {
        crate::schema::Value::Null
    } else {
        parse_literal(col.col_type, &value)?
    };

    let pred = Predicate::new(&col, op, literal)?;
    match chain {
        Some(chain) => pred.with_chain(chain),
        None => Ok(pred),
    }
}

/// Render predicates back into the text grammar
pub fn preds_to_string(preds: &[Predicate], schema: &Schema) -> String {
    let mut out = String::new();
    for pred in preds {
        let colname = if pred.is_rid() {
            RID_COL_NAME.to_string()
        } else {
            match schema.by_idx(pred.col_idx) {
                Some(col) => col.name.clone(),
                None => continue,
            }
        };
        out.push(PRED_DELIM_OUTER);
        out.push_str(&colname);
        out.push(PRED_DELIM_INNER);
        out.push_str(pred.op.as_str());
        out.push(PRED_DELIM_INNER);
        out.push_str(&literal_to_string(&pred.literal));
        if pred.chain_op == Op::LogicalOr {
            out.push(PRED_DELIM_INNER);
            out.push_str(Op::LogicalOr.as_str());
        }
    }
    out.push(PRED_DELIM_OUTER);
    out
}

/// Target column names of the predicates, in predicate order
pub fn colnames_from_preds(preds: &[Predicate], schema: &Schema) -> Vec<String> {
    preds
        .iter()
        .filter_map(|p| {
            if p.is_rid() {
                Some(RID_COL_NAME.to_string())
            } else {
                schema.by_idx(p.col_idx).map(|c| c.name.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ScalarType, Value};

    fn schema() -> Schema {
        Schema::parse(
            "0 4 1 0 ORDERKEY;1 13 0 1 EXTENDEDPRICE;2 15 0 1 COMMENT;3 9 0 0 FLAG;4 14 0 0 SHIPDATE",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_and_wildcard() {
        assert!(parse_predicates(&schema(), "").unwrap().is_empty());
        assert!(parse_predicates(&schema(), " ;*; ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_typed_literals() {
        let preds = parse_predicates(&schema(), ";orderkey,eq,5;comment,like,hello world;").unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].col_idx, 0);
        assert_eq!(preds[0].literal, Value::Int64(5));
        assert_eq!(preds[1].op, Op::Like);
        assert_eq!(preds[1].literal, Value::Str("hello world".into()));
    }

    #[test]
    fn test_aggregates_move_to_end() {
        let preds = parse_predicates(
            &schema(),
            ";extendedprice,sum,0;orderkey,gt,1;orderkey,max,0;flag,eq,A;",
        )
        .unwrap();
        let ops: Vec<Op> = preds.iter().map(|p| p.op).collect();
        assert_eq!(ops, vec![Op::Gt, Op::Eq, Op::Sum, Op::Max]);
    }

    #[test]
    fn test_chain_operator_field() {
        let preds = parse_predicates(&schema(), ";orderkey,eq,5;orderkey,eq,7,logical_or;").unwrap();
        assert_eq!(preds[0].chain_op, Op::LogicalAnd);
        assert_eq!(preds[1].chain_op, Op::LogicalOr);
    }

    #[test]
    fn test_like_value_with_commas() {
        let preds = parse_predicates(&schema(), ";comment,like,a{1,2}b;").unwrap();
        assert_eq!(preds[0].literal, Value::Str("a{1,2}b".into()));
    }

    #[test]
    fn test_rid_column() {
        let preds = parse_predicates(&schema(), ";rid,lt,3;").unwrap();
        assert!(preds[0].is_rid());
        assert_eq!(preds[0].col_type, ScalarType::UInt64);
    }

    #[test]
    fn test_missing_column_is_error() {
        let err = parse_predicates(&schema(), ";nope,eq,5;").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::RequestedColNotPresent);
    }

    #[test]
    fn test_unknown_operator_is_error() {
        let err = parse_predicates(&schema(), ";orderkey,approx,5;").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::OpNotRecognized);
    }

    #[test]
    fn test_to_string_reparses() {
        let s = schema();
        let text = ";orderkey,geq,5;flag,eq,Q;rid,ne,2,logical_or;extendedprice,min,0;";
        let preds = parse_predicates(&s, text).unwrap();
        let rendered = preds_to_string(&preds, &s);
        assert_eq!(
            rendered,
            ";ORDERKEY,geq,5;FLAG,eq,Q;RID,ne,2,logical_or;EXTENDEDPRICE,min,0;"
        );
        let again = parse_predicates(&s, &rendered).unwrap();
        assert_eq!(again.len(), preds.len());
        assert_eq!(again[2].chain_op, Op::LogicalOr);
    }

    #[test]
    fn test_colnames_from_preds() {
        let s = schema();
        let preds = parse_predicates(&s, ";comment,like,x;orderkey,lt,3;").unwrap();
        assert_eq!(colnames_from_preds(&preds, &s), vec!["COMMENT", "ORDERKEY"]);
    }
}
