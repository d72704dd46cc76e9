mod column;
#[allow(clippy::module_inception)]
mod dataframe;
mod group_by;
mod ops;
mod reduce;
mod row;
mod scalar;
mod sort;

/// Typed column storage.
pub use column::{Column, ColumnData};
/// Eager `DataFrame` and its column derivations.
pub use dataframe::{data_frame_of, DataFrame, DerivedColumn, Mutation};
/// Grouped tables and per-group reductions.
pub use group_by::{Aggregate, GroupedDataFrame};
pub use ops::Operand;
pub use row::Row;
/// Boxed cell values and column variants.
pub use scalar::{ColumnType, Scalar};
