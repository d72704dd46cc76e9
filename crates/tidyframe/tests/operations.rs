mod common;

use tidyframe::{Column, ColumnType, DataFrame, DataFrameError, Mutation, Scalar};

use common::{init_test_tracing, people};

fn first_names(df: &DataFrame) -> Vec<String> {
    df.column("first_name")
        .unwrap()
        .as_texts()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn filter_by_equality_keeps_order() {
    init_test_tracing();
    let out = people().filter(|df| df.column("age")?.eq(23)).unwrap();
    assert_eq!(first_names(&out), vec!["Max", "Franz"]);
    assert_eq!(out.width(), 4);
}

#[test]
fn filter_by_row_sees_boxed_values() {
    let out = people()
        .filter_by_row(|row| row["last_name"].as_text().is_some_and(|s| s.starts_with('S')))
        .unwrap();
    assert_eq!(first_names(&out), vec!["Franz"]);
}

#[test]
fn filter_with_combined_predicates() {
    let out = people()
        .filter(|df| {
            df.column("age")?
                .gt(20)?
                .and(&df.column("weight")?.lt(60)?)
        })
        .unwrap();
    assert_eq!(first_names(&out), vec!["Max"]);
}

#[test]
fn select_all_names_is_identity() {
    let df = people();
    let names: Vec<String> = df.names().into_iter().map(str::to_string).collect();
    assert_eq!(df.select(&names).unwrap(), df);
}

#[test]
fn sort_is_stable_on_ties() {
    let sorted = people().sorted_by(["age"]).unwrap();
    assert_eq!(first_names(&sorted), vec!["Horst", "Max", "Franz"]);

    let desc = people().sorted_by_descending(["age", "weight"]).unwrap();
    assert_eq!(first_names(&desc), vec!["Franz", "Max", "Horst"]);
}

#[test]
fn sort_by_derived_key() {
    let sorted = people()
        .sorted_by_column(|df| df.column("weight")?.sub(df.column("age")?))
        .unwrap();
    // weight - age: 32, 65, 70
    assert_eq!(first_names(&sorted), vec!["Max", "Franz", "Horst"]);
}

#[test]
fn sort_unknown_key_fails() {
    assert!(matches!(
        people().sorted_by(["height"]).unwrap_err(),
        DataFrameError::UnknownColumn { .. }
    ));
}

#[test]
fn add_columns_sees_earlier_derivations() {
    let out = people()
        .add_columns([
            Mutation::new("bmi_ish", |df: &DataFrame| {
                df.column("weight")?.div(df.column("age")?)
            }),
            Mutation::new("heavy", |df: &DataFrame| df.column("bmi_ish")?.gt(4.0)),
            Mutation::new("full_name", |df: &DataFrame| {
                df.column("first_name")?
                    .add(" ")?
                    .add(df.column("last_name")?)
            }),
            Mutation::new("id", |df: &DataFrame| Ok(df.row_numbers())),
            Mutation::new("source", |_: &DataFrame| Ok("survey")),
        ])
        .unwrap();

    assert_eq!(
        out.column("bmi_ish").unwrap().column_type(),
        ColumnType::Double
    );
    assert_eq!(
        out.column("heavy").unwrap().as_bools().unwrap(),
        vec![Some(false), Some(false), Some(true)]
    );
    assert_eq!(
        out.column("full_name").unwrap().get(2).unwrap(),
        Scalar::from("Horst Keanes")
    );
    assert_eq!(
        out.column("id").unwrap().as_ints().unwrap(),
        vec![Some(1), Some(2), Some(3)]
    );
    assert_eq!(out.column("source").unwrap().get(1).unwrap(), Scalar::from("survey"));
}

#[test]
fn missing_values_propagate_through_ops_and_map() {
    let df = DataFrame::new(vec![
        Column::ints("a", [Some(1_i64), None, Some(3)]),
        Column::doubles("b", [Some(0.5), Some(1.0), None]),
    ])
    .unwrap();

    let sum = df.column("a").unwrap().add(df.column("b").unwrap()).unwrap();
    assert_eq!(sum.as_doubles().unwrap(), vec![Some(1.5), None, None]);

    let cmp = df.column("a").unwrap().ge(2).unwrap();
    assert_eq!(cmp.as_bools().unwrap(), vec![Some(false), None, Some(true)]);

    let mapped = df
        .column("a")
        .unwrap()
        .map(|v| Scalar::Int(v.as_int().unwrap_or_default() * 10))
        .unwrap();
    assert_eq!(mapped.as_ints().unwrap(), vec![Some(10), None, Some(30)]);
}

#[test]
fn elementwise_length_mismatch() {
    let a = Column::ints("a", [1_i64, 2]);
    let b = Column::ints("b", [1_i64, 2, 3]);
    assert!(matches!(
        a.add(&b).unwrap_err(),
        DataFrameError::LengthMismatch { .. }
    ));
}

#[test]
fn transforms_leave_source_untouched() {
    let df = people();
    let snapshot = df.clone();
    let _ = df.remove(["weight"]).unwrap();
    let _ = df.add_column("weight", |_| Ok(0)).unwrap();
    let _ = df.sorted_by(["age"]).unwrap();
    assert_eq!(df, snapshot);
}
