use arrow::array::StringArray;

use crate::dataframe::{Column, DataFrame};
use crate::infer::TypeInferencer;
use crate::{DataFrameError, Result};

/// Untyped text records: a header naming the columns plus row-major cells.
///
/// This is the boundary shape between the CSV codec and typed tables. Cells equal
/// to `"NA"` are missing values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecords {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawRecords {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }
}

/// Build a typed table from raw records, inferring each column's variant.
pub fn from_records(records: &RawRecords, inferencer: &TypeInferencer) -> Result<DataFrame> {
    for (i, row) in records.rows.iter().enumerate() {
        if row.len() != records.header.len() {
            return Err(DataFrameError::length_mismatch(
                format!("record {i}"),
                records.header.len(),
                row.len(),
            ));
        }
    }

    let columns = records
        .header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: StringArray = records
                .rows
                .iter()
                .map(|row| Some(row[idx].as_str()))
                .collect();
            inferencer.materialize(name, &cells)
        })
        .collect::<Result<Vec<Column>>>()?;

    if columns.is_empty() {
        return Ok(DataFrame::empty());
    }
    DataFrame::new(columns)
}

/// Render a table as raw records; missing cells become `"NA"`.
pub fn to_records(df: &DataFrame) -> RawRecords {
    let header = df.names().into_iter().map(str::to_string).collect();
    let rows = df
        .rows()
        .map(|row| row.values().iter().map(|v| v.to_string()).collect())
        .collect();
    RawRecords { header, rows }
}
