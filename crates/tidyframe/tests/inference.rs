mod common;

use tidyframe::infer::{is_bool_col, is_double_col, is_int_col};
use tidyframe::io::{from_records, to_records, RawRecords};
use tidyframe::{ColumnType, DataFrameError, TypeInferencer};

use common::people;

fn raw(header: &[&str], rows: &[&[&str]]) -> RawRecords {
    RawRecords::new(
        header.iter().map(|s| s.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
}

#[test]
fn bool_sample_scenarios() {
    assert!(is_bool_col(&["T", "F", "NA", "true", "false"]));
    assert!(!is_bool_col(&["T", "F", "maybe"]));

    let inferencer = TypeInferencer::default();
    assert_eq!(
        inferencer.infer(["T", "F", "NA", "true", "false"].into_iter().map(Some)),
        ColumnType::Bool
    );
    assert_eq!(
        inferencer.infer(["T", "F", "maybe"].into_iter().map(Some)),
        ColumnType::Text
    );
}

#[test]
fn numeric_sample_predicates() {
    assert!(is_double_col(&["1", "2.5", "NA"]));
    assert!(is_int_col(&["1", "-2", "NA"]));
    assert!(!is_int_col(&["1", "2.5"]));
}

#[test]
fn late_numbers_stay_text() {
    let records = raw(
        &["code"],
        &[&["a"], &["b"], &["c"], &["d"], &["e"], &["42"]],
    );
    let df = from_records(&records, &TypeInferencer::default()).unwrap();
    assert_eq!(df.column("code").unwrap().column_type(), ColumnType::Text);
}

#[test]
fn larger_sample_sees_more_rows() {
    let records = raw(
        &["n"],
        &[&["NA"], &["NA"], &["NA"], &["NA"], &["NA"], &["x"]],
    );
    let err = from_records(&records, &TypeInferencer::default()).unwrap_err();
    assert!(matches!(err, DataFrameError::Parse { row: 5, .. }));

    let df = from_records(&records, &TypeInferencer::new(6).unwrap()).unwrap();
    assert_eq!(df.column("n").unwrap().column_type(), ColumnType::Text);
    assert_eq!(df.column("n").unwrap().missing_count(), 5);
}

#[test]
fn records_roundtrip_through_inference() {
    let df = people();
    let records = to_records(&df);
    assert_eq!(records.rows[0], vec!["Max", "Doe", "23", "55"]);
    assert_eq!(
        from_records(&records, &TypeInferencer::default()).unwrap(),
        df
    );
}
