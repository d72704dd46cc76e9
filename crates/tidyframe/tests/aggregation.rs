mod common;

use tidyframe::{Aggregate, Column, ColumnType, DataFrame, DataFrameError, Scalar};

use common::{init_test_tracing, people};

fn mean_weight() -> Aggregate {
    Aggregate::new("mean_weight", |df: &DataFrame| {
        df.column("weight")?.mean(true)
    })
}

fn num_persons() -> Aggregate {
    Aggregate::new("num_persons", |df: &DataFrame| Ok(Scalar::from(df.height())))
}

#[test]
fn summarize_by_age_in_first_appearance_order() {
    init_test_tracing();
    let out = people()
        .group_by(["age"])
        .unwrap()
        .summarize([mean_weight(), num_persons()])
        .unwrap();

    let rows: Vec<Vec<Scalar>> = out.rows().map(|r| r.into_values()).collect();
    assert_eq!(
        rows,
        vec![
            vec![Scalar::Int(23), Scalar::Double(71.5), Scalar::Int(2)],
            vec![Scalar::Int(12), Scalar::Double(82.0), Scalar::Int(1)],
        ]
    );
}

#[test]
fn partition_covers_every_row_once() {
    let df = DataFrame::new(vec![
        Column::texts("k", ["b", "a", "b", "c", "a", "b"]),
        Column::ints("v", [1_i64, 2, 3, 4, 5, 6]),
    ])
    .unwrap();
    let grouped = df.group_by(["k"]).unwrap();

    let mut seen: Vec<usize> = grouped.group_rows().iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..df.height()).collect::<Vec<_>>());
    assert_eq!(grouped.group_rows(), &[vec![0, 2, 5], vec![1, 4], vec![3]]);

    let sizes: Vec<usize> = grouped
        .groups()
        .unwrap()
        .iter()
        .map(DataFrame::height)
        .collect();
    assert_eq!(sizes, vec![3, 2, 1]);
}

#[test]
fn summarize_widens_mixed_numeric_results() {
    let df = DataFrame::new(vec![
        Column::ints("k", [1_i64, 2]),
        Column::doubles("w", [1.0, 2.5]),
    ])
    .unwrap();
    let out = df
        .group_by(["k"])
        .unwrap()
        .summarize([Aggregate::new("x", |df: &DataFrame| {
            let w = df.column("w")?.sum(true)?;
            Ok(match w.as_double() {
                Some(v) if v.fract() == 0.0 => Scalar::Int(v as i64),
                _ => w,
            })
        })])
        .unwrap();
    assert_eq!(out.column("x").unwrap().column_type(), ColumnType::Double);
    assert_eq!(
        out.column("x").unwrap().as_doubles().unwrap(),
        vec![Some(1.0), Some(2.5)]
    );
}

#[test]
fn count_by_key_and_overall() {
    let by_age = people().count(["age"]).unwrap();
    assert_eq!(by_age.names(), vec!["age", "n"]);
    assert_eq!(
        by_age.column("n").unwrap().as_ints().unwrap(),
        vec![Some(2), Some(1)]
    );

    let overall = people().count(Vec::<&str>::new()).unwrap();
    assert_eq!(overall.column("n").unwrap().get(0).unwrap(), Scalar::Int(3));
}

#[test]
fn ungroup_returns_base_table() {
    let df = people();
    assert_eq!(df.group_by(["age", "last_name"]).unwrap().ungroup(), df);
}

#[test]
fn reducers_poison_on_missing_unless_removed() {
    let df = DataFrame::new(vec![
        Column::ints("k", [1_i64, 1, 2]),
        Column::doubles("w", [Some(2.0), None, Some(4.0)]),
    ])
    .unwrap();
    let out = df
        .group_by(["k"])
        .unwrap()
        .summarize([
            Aggregate::new("poisoned", |df: &DataFrame| df.column("w")?.mean(false)),
            Aggregate::new("kept", |df: &DataFrame| df.column("w")?.mean(true)),
            Aggregate::new("present", |df: &DataFrame| Ok(df.column("w")?.count(true))),
        ])
        .unwrap();
    assert_eq!(
        out.column("poisoned").unwrap().as_doubles().unwrap(),
        vec![None, Some(4.0)]
    );
    assert_eq!(
        out.column("kept").unwrap().as_doubles().unwrap(),
        vec![Some(2.0), Some(4.0)]
    );
    assert_eq!(
        out.column("present").unwrap().as_ints().unwrap(),
        vec![Some(1), Some(1)]
    );
}

#[test]
fn summarize_name_collision() {
    let err = people()
        .group_by(["age"])
        .unwrap()
        .summarize([num_persons(), num_persons()])
        .unwrap_err();
    assert!(matches!(err, DataFrameError::DuplicateColumnName { .. }));
}
