#![allow(dead_code)]

use tidyframe::{data_frame_of, DataFrame};

/// Test tracing setup (stderr, filtered by `RUST_LOG`).
pub fn init_test_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub const PEOPLE_CSV: &str = "first_name,last_name,age,weight\n\
Max,Doe,23,55\n\
Franz,Smith,23,88\n\
Horst,Keanes,12,82\n";

pub fn people() -> DataFrame {
    data_frame_of(
        &["first_name", "last_name", "age", "weight"],
        vec![
            "Max".into(),
            "Doe".into(),
            23.into(),
            55.into(),
            "Franz".into(),
            "Smith".into(),
            23.into(),
            88.into(),
            "Horst".into(),
            "Keanes".into(),
            12.into(),
            82.into(),
        ],
    )
    .expect("valid literal table")
}
