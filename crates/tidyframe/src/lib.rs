//! `tidyframe` is a small, column-oriented, immutable DataFrame built on Arrow.
//!
//! Tables hold uniquely named columns of one of four variants (`Double`, `Int`,
//! `Bool`, `Text`), each cell optionally missing. CSV / TSV files are ingested via
//! `arrow-csv` with per-column type inference over a short sample of leading
//! cells. Transforms (`select`, `filter`, `sorted_by`, `add_column`, `group_by`,
//! `summarize`) always return new tables and leave their input untouched.

mod error;

/// Eager DataFrame, Column and grouping types.
pub mod dataframe;
/// Column type inference for raw text cells.
pub mod infer;
/// CSV / TSV I/O, option types and the raw record boundary.
pub mod io;

/// Re-export of the primary table types.
pub use crate::dataframe::{
    data_frame_of, Aggregate, Column, ColumnData, ColumnType, DataFrame, DerivedColumn,
    GroupedDataFrame, Mutation, Row, Scalar,
};
/// Re-export of the crate error type and result alias.
pub use crate::error::{DataFrameError, Result};
/// Re-export of the type inferencer.
pub use crate::infer::TypeInferencer;
/// Re-export of eager CSV / TSV I/O helpers.
pub use crate::io::{read_csv, read_tsv, write_csv, write_tsv};
