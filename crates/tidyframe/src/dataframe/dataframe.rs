use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, UInt32Array};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::dataframe::group_by::{Aggregate, GroupedDataFrame};
use crate::dataframe::sort::sort_indices;
use crate::dataframe::{Column, ColumnData, ColumnType, Row, Scalar};
use crate::{DataFrameError, Result};

/// Result of a column derivation: a full column or a constant broadcast to every row.
#[derive(Debug, Clone)]
pub enum DerivedColumn {
    Column(Column),
    Constant(Scalar),
}

impl From<Column> for DerivedColumn {
    fn from(c: Column) -> Self {
        DerivedColumn::Column(c)
    }
}

impl From<Scalar> for DerivedColumn {
    fn from(s: Scalar) -> Self {
        DerivedColumn::Constant(s)
    }
}

macro_rules! derived_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for DerivedColumn {
                fn from(v: $t) -> Self {
                    DerivedColumn::Constant(Scalar::from(v))
                }
            }
        )*
    };
}

derived_from_scalar!(bool, i32, i64, f64, String, &str);

type DeriveFn = dyn Fn(&DataFrame) -> Result<DerivedColumn> + Send + Sync;

/// A named column derivation, used by [`DataFrame::add_columns`].
pub struct Mutation {
    name: String,
    derive: Box<DeriveFn>,
}

impl Mutation {
    pub fn new<F, T>(name: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&DataFrame) -> Result<T> + Send + Sync + 'static,
        T: Into<DerivedColumn>,
    {
        Self {
            name: name.into(),
            derive: Box::new(move |df: &DataFrame| derive(df).map(Into::into)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation").field("name", &self.name).finish()
    }
}

/// An immutable table of uniquely named, equal-length columns.
///
/// Every transform returns a new `DataFrame`; columns that a transform does not
/// touch share their storage with the source table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    height: usize,
}

impl DataFrame {
    /// Construct a `DataFrame` from columns, validating names and lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map(|c| c.len()).unwrap_or(0);
        Self::with_height(columns, height)
    }

    fn with_height(columns: Vec<Column>, height: usize) -> Result<Self> {
        let mut seen_names = HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen_names.insert(c.name()) {
                return Err(DataFrameError::duplicate_column(c.name()));
            }
            if c.len() != height {
                return Err(DataFrameError::length_mismatch(
                    format!("column '{}'", c.name()),
                    height,
                    c.len(),
                ));
            }
        }
        Ok(Self { columns, height })
    }

    /// Return an empty `DataFrame` (no columns, no rows).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from row-major values; each column's variant is derived from
    /// its values the way [`Column::from_scalars`] does.
    pub fn from_rows<S>(header: &[S], rows: Vec<Vec<Scalar>>) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let mut cells: Vec<Vec<Scalar>> = vec![Vec::with_capacity(rows.len()); header.len()];
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != header.len() {
                return Err(DataFrameError::length_mismatch(
                    format!("row {i}"),
                    header.len(),
                    row.len(),
                ));
            }
            for (col, value) in cells.iter_mut().zip(row) {
                col.push(value);
            }
        }

        let columns = header
            .iter()
            .zip(cells)
            .map(|(name, values)| Column::from_scalars(name.as_ref(), &values))
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    /// Wrap an Arrow record batch (shares the underlying buffers).
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let columns = batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(f, a)| Column::from_arrow(f.name(), a.clone()))
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, batch.num_rows())
    }

    /// Convert to an Arrow record batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(c.name(), c.column_type().to_arrow(), true))
            .collect();
        let arrays: Vec<ArrayRef> = self.columns.iter().map(Column::to_arrow).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.height));
        RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
            .map_err(|source| DataFrameError::Arrow { source })
    }

    /// Return the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Column variants in table order.
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(Column::column_type).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get a column by name (case-sensitive).
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| DataFrameError::unknown_column(name))
    }

    /// Return all columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return row `index` as boxed values.
    pub fn row(&self, index: usize) -> Result<Row> {
        if index >= self.height {
            return Err(DataFrameError::index_out_of_range(index, self.height));
        }
        Ok(Row::new(self.shared_names(), self.row_values(index)))
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        let names = self.shared_names();
        (0..self.height).map(move |i| Row::new(Arc::clone(&names), self.row_values(i)))
    }

    /// 1-based row numbers as an `Int` column named `row_number`.
    pub fn row_numbers(&self) -> Column {
        Column::ints("row_number", 1..=self.height as i64)
    }

    /// Keep exactly the named columns, in the given order.
    pub fn select<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_string()) {
                return Err(DataFrameError::duplicate_column(name));
            }
            columns.push(self.column(name)?.clone());
        }
        Self::with_height(columns, self.height)
    }

    /// Keep the columns for which `predicate` holds, in table order.
    pub fn select_where<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Column) -> bool,
    {
        Self {
            columns: self
                .columns
                .iter()
                .filter(|c| predicate(c))
                .cloned()
                .collect(),
            height: self.height,
        }
    }

    /// Keep the columns whose name matches `predicate`, in table order.
    pub fn select_by_name<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        self.select_where(|c| predicate(c.name()))
    }

    /// Drop the named columns.
    pub fn remove<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dropped = HashSet::new();
        for name in names {
            let name = name.as_ref();
            self.column(name)?;
            dropped.insert(name.to_string());
        }
        Ok(self.select_where(|c| !dropped.contains(c.name())))
    }

    /// Evaluate `derive` against this table and append its result as `name`,
    /// replacing (in place) an existing column of the same name.
    pub fn add_column<F, T>(&self, name: &str, derive: F) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> Result<T>,
        T: Into<DerivedColumn>,
    {
        let derived = derive(self)?.into();
        self.put_column(name, derived)
    }

    /// Apply several derivations in order; each sees the columns added before it.
    pub fn add_columns<I>(&self, mutations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Mutation>,
    {
        let mut df = self.clone();
        for m in mutations {
            let derived = (m.derive)(&df)?;
            df = df.put_column(&m.name, derived)?;
        }
        Ok(df)
    }

    /// Keep the rows where `predicate` evaluates to `true`; missing counts as `false`.
    pub fn filter<F>(&self, predicate: F) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> Result<Column>,
    {
        let mask = predicate(self)?;
        if mask.len() != self.height {
            return Err(DataFrameError::length_mismatch(
                "filter predicate",
                self.height,
                mask.len(),
            ));
        }
        let ColumnData::Bool(mask) = mask.data() else {
            return Err(DataFrameError::type_mismatch(
                Some(mask.name().to_string()),
                "Bool",
                mask.column_type().to_string(),
            ));
        };
        self.filter_mask(mask)
    }

    /// Keep the rows for which `predicate` returns `true`, calling it once per row.
    pub fn filter_by_row<F>(&self, mut predicate: F) -> Result<Self>
    where
        F: FnMut(&Row) -> bool,
    {
        let mask: BooleanArray = self.rows().map(|row| Some(predicate(&row))).collect();
        self.filter_mask(&mask)
    }

    /// Stable ascending sort by the named columns; missing values sort last.
    pub fn sorted_by<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sort(keys, false)
    }

    /// Stable descending sort by the named columns; missing values still sort last.
    pub fn sorted_by_descending<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sort(keys, true)
    }

    /// Stable sort by the named columns in the given direction.
    pub fn sort<I, S>(&self, keys: I, descending: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|k| self.column(k.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if keys.is_empty() {
            return Ok(self.clone());
        }
        self.take(&sort_indices(&keys, descending))
    }

    /// Stable ascending sort by a derived key column.
    pub fn sorted_by_column<F>(&self, key: F) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> Result<Column>,
    {
        let key = key(self)?;
        if key.len() != self.height {
            return Err(DataFrameError::length_mismatch(
                "sort key",
                self.height,
                key.len(),
            ));
        }
        self.take(&sort_indices(&[&key], false))
    }

    /// Partition rows by the distinct values of `keys`.
    pub fn group_by<I, S>(&self, keys: I) -> Result<GroupedDataFrame>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        GroupedDataFrame::new(
            self.clone(),
            keys.into_iter().map(|k| k.as_ref().to_string()).collect(),
        )
    }

    /// Reduce the whole table to a single row of named aggregates.
    pub fn summarize<I>(&self, aggregates: I) -> Result<Self>
    where
        I: IntoIterator<Item = Aggregate>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for agg in aggregates {
            if !seen.insert(agg.name().to_string()) {
                return Err(DataFrameError::duplicate_column(agg.name()));
            }
            let value = agg.evaluate(self)?;
            columns.push(Column::from_scalars(agg.name(), &[value])?);
        }
        Self::with_height(columns, 1)
    }

    /// Number of rows per distinct combination of `keys`, in a column named `n`.
    pub fn count<I, S>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let n = Aggregate::new("n", |df: &DataFrame| Ok(Scalar::from(df.height())));
        if keys.is_empty() {
            return self.summarize([n]);
        }
        self.group_by(keys)?.summarize([n])
    }

    pub(crate) fn take(&self, indices: &UInt32Array) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(indices))
            .collect::<Result<Vec<_>>>()?;
        Self::with_height(columns, indices.len())
    }

    fn filter_mask(&self, mask: &BooleanArray) -> Result<Self> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.filter(mask))
            .collect::<Result<Vec<_>>>()?;
        let height = mask.iter().filter(|v| *v == Some(true)).count();
        Self::with_height(columns, height)
    }

    fn put_column(&self, name: &str, derived: DerivedColumn) -> Result<Self> {
        let column = match derived {
            DerivedColumn::Column(c) => {
                if c.len() != self.height {
                    return Err(DataFrameError::length_mismatch(
                        format!("derived column '{name}'"),
                        self.height,
                        c.len(),
                    ));
                }
                c.rename(name)
            }
            DerivedColumn::Constant(s) => Column::broadcast(name, &s, self.height),
        };

        let mut columns = self.columns.clone();
        match self.position(name) {
            Some(idx) => columns[idx] = column,
            None => columns.push(column),
        }
        Self::with_height(columns, self.height)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    fn shared_names(&self) -> Arc<[String]> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    fn row_values(&self, index: usize) -> Vec<Scalar> {
        self.columns
            .iter()
            .map(|c| c.data().scalar_at(index))
            .collect()
    }
}

/// Build a table from a header and a flat, row-major list of values.
///
/// `data_frame_of(&["name", "age"], vec!["Max".into(), 23.into()])` yields one row.
pub fn data_frame_of<S>(header: &[S], values: Vec<Scalar>) -> Result<DataFrame>
where
    S: AsRef<str>,
{
    if header.is_empty() {
        if values.is_empty() {
            return Ok(DataFrame::empty());
        }
        return Err(DataFrameError::invalid_operation(
            "values given for a table without columns",
        ));
    }
    if values.len() % header.len() != 0 {
        return Err(DataFrameError::invalid_operation(format!(
            "{} values do not fill rows of {} columns",
            values.len(),
            header.len()
        )));
    }

    let mut rows = Vec::with_capacity(values.len() / header.len());
    let mut values = values.into_iter();
    loop {
        let row: Vec<Scalar> = values.by_ref().take(header.len()).collect();
        if row.is_empty() {
            break;
        }
        rows.push(row);
    }
    DataFrame::from_rows(header, rows)
}
