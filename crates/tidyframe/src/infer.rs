//! Column type inference for raw text cells.
//!
//! Only a bounded prefix of each column is sampled. A column whose numeric values
//! first appear past the sample is classified as `Text`; a column committed to a
//! type by its sample fails with [`DataFrameError::Parse`] when a later cell does
//! not conform.

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};

use crate::dataframe::{Column, ColumnData, ColumnType};
use crate::{DataFrameError, Result};

/// Missing-value token in raw text.
pub const NA_LITERAL: &str = "NA";

/// Number of leading cells sampled per column unless configured otherwise.
pub const DEFAULT_PEEK_SIZE: usize = 5;

/// Decides and materializes the variant of a raw text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInferencer {
    peek_size: usize,
}

impl Default for TypeInferencer {
    fn default() -> Self {
        Self {
            peek_size: DEFAULT_PEEK_SIZE,
        }
    }
}

impl TypeInferencer {
    /// Create an inferencer sampling `peek_size` leading cells (at least one).
    pub fn new(peek_size: usize) -> Result<Self> {
        if peek_size == 0 {
            return Err(DataFrameError::configuration(
                "peek_size",
                "peek_size must be at least 1",
            ));
        }
        Ok(Self { peek_size })
    }

    pub fn peek_size(&self) -> usize {
        self.peek_size
    }

    /// Classify a column from its leading cells; `None` and `"NA"` are missing.
    ///
    /// Never fails: `Text` accepts anything.
    pub fn infer<'a, I>(&self, cells: I) -> ColumnType
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let sample: Vec<&str> = cells
            .into_iter()
            .take(self.peek_size)
            .map(|c| c.unwrap_or(NA_LITERAL))
            .collect();

        if is_double_col(&sample) {
            // integer literals are a refinement of the double grammar
            if sample.iter().any(|c| !is_na(c)) && is_int_col(&sample) {
                ColumnType::Int
            } else {
                ColumnType::Double
            }
        } else if is_bool_col(&sample) {
            ColumnType::Bool
        } else {
            ColumnType::Text
        }
    }

    /// Infer the variant of `cells` and parse every cell into it.
    pub fn materialize(&self, name: &str, cells: &StringArray) -> Result<Column> {
        let ty = self.infer(cells.iter().take(self.peek_size));
        tracing::debug!(column = name, column_type = %ty, rows = cells.len(), "inferred column type");
        parse_column(name, ty, cells)
    }
}

/// Parse every cell of `cells` as `ty`.
///
/// An `Int` column whose later cells only parse as doubles is widened to `Double`;
/// any other non-conforming cell is a [`DataFrameError::Parse`].
pub fn parse_column(name: &str, ty: ColumnType, cells: &StringArray) -> Result<Column> {
    let data = match ty {
        ColumnType::Int => match parse_cells(name, cells, "Int", parse_int) {
            Ok(v) => ColumnData::Int(v.into_iter().collect::<Int64Array>()),
            Err(err) => {
                let Ok(v) = parse_cells(name, cells, "Double", parse_double) else {
                    return Err(err);
                };
                tracing::debug!(column = name, "widened integer column to double");
                ColumnData::Double(v.into_iter().collect::<Float64Array>())
            }
        },
        ColumnType::Double => ColumnData::Double(
            parse_cells(name, cells, "Double", parse_double)?
                .into_iter()
                .collect::<Float64Array>(),
        ),
        ColumnType::Bool => ColumnData::Bool(
            parse_cells(name, cells, "Bool", parse_bool)?
                .into_iter()
                .collect::<BooleanArray>(),
        ),
        ColumnType::Text => ColumnData::Text(
            cells
                .iter()
                .map(|c| c.filter(|s| !is_na(s)))
                .collect::<StringArray>(),
        ),
    };
    Ok(Column::new(name, data))
}

fn parse_cells<T>(
    name: &str,
    cells: &StringArray,
    expected: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            None => Ok(None),
            Some(s) if is_na(s) => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| DataFrameError::parse(name, row, s, expected)),
        })
        .collect()
}

/// Returns `true` if every non-NA cell parses as a double.
pub fn is_double_col(sample: &[&str]) -> bool {
    sample.iter().all(|c| is_na(c) || parse_double(c).is_some())
}

/// Returns `true` if every non-NA cell parses as a 64-bit integer.
pub fn is_int_col(sample: &[&str]) -> bool {
    sample.iter().all(|c| is_na(c) || parse_int(c).is_some())
}

/// Returns `true` if every non-NA cell is one of `true`, `false`, `T`, `F`.
pub fn is_bool_col(sample: &[&str]) -> bool {
    sample.iter().all(|c| is_na(c) || parse_bool(c).is_some())
}

fn is_na(cell: &str) -> bool {
    cell == NA_LITERAL
}

/// Decimal or scientific notation with surrounding whitespace ignored. The only
/// non-finite spellings accepted are `NaN`, `Infinity`, `+Infinity` and `-Infinity`.
fn parse_double(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    match cell {
        "NaN" => return Some(f64::NAN),
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if cell
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E'))
    {
        return None;
    }
    cell.parse().ok()
}

fn parse_int(cell: &str) -> Option<i64> {
    cell.parse().ok()
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "T" => Some(true),
        "false" | "F" => Some(false),
        _ => None,
    }
}
