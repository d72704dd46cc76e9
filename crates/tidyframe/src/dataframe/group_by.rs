use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrow::array::UInt32Array;

use crate::dataframe::column::unify_types;
use crate::dataframe::{Column, ColumnData, ColumnType, DataFrame, Scalar};
use crate::{DataFrameError, Result};

type AggregateFn = dyn Fn(&DataFrame) -> Result<Scalar> + Send + Sync;

/// A named reduction evaluated once per group.
#[derive(Clone)]
pub struct Aggregate {
    name: String,
    reduce: Arc<AggregateFn>,
}

impl Aggregate {
    pub fn new<F>(name: impl Into<String>, reduce: F) -> Self
    where
        F: Fn(&DataFrame) -> Result<Scalar> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            reduce: Arc::new(reduce),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn evaluate(&self, df: &DataFrame) -> Result<Scalar> {
        (self.reduce)(df)
    }
}

impl std::fmt::Debug for Aggregate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregate").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey(Vec<KeyValue>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyValue {
    Missing,
    Bool(bool),
    Int(i64),
    Double(u64),
    Text(String),
}

fn key_value_at(data: &ColumnData, row: usize) -> KeyValue {
    if data.as_array().is_null(row) {
        return KeyValue::Missing;
    }
    match data {
        ColumnData::Bool(a) => KeyValue::Bool(a.value(row)),
        ColumnData::Int(a) => KeyValue::Int(a.value(row)),
        ColumnData::Double(a) => KeyValue::Double(normalized_bits(a.value(row))),
        ColumnData::Text(a) => KeyValue::Text(a.value(row).to_string()),
    }
}

fn normalized_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0_f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// A table partitioned by the distinct values of one or more key columns.
///
/// Groups are listed in order of first appearance in the base table, and the
/// rows of each group keep their base-table order.
#[derive(Debug, Clone)]
pub struct GroupedDataFrame {
    base: DataFrame,
    keys: Vec<String>,
    groups: Vec<Vec<usize>>,
}

impl GroupedDataFrame {
    pub(crate) fn new(base: DataFrame, keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(DataFrameError::invalid_operation(
                "group_by requires at least one key column",
            ));
        }
        let mut seen = HashSet::new();
        let mut key_columns = Vec::with_capacity(keys.len());
        for k in &keys {
            if !seen.insert(k.as_str()) {
                return Err(DataFrameError::duplicate_column(k));
            }
            key_columns.push(base.column(k)?);
        }

        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for row in 0..base.height() {
            let key = GroupKey(
                key_columns
                    .iter()
                    .map(|c| key_value_at(c.data(), row))
                    .collect(),
            );
            let next = groups.len();
            let group_idx = *index.entry(key).or_insert(next);
            if group_idx == next {
                groups.push(Vec::new());
            }
            groups[group_idx].push(row);
        }

        tracing::trace!(
            keys = ?keys,
            rows = base.height(),
            groups = groups.len(),
            "partitioned table"
        );
        Ok(Self { base, keys, groups })
    }

    /// Key column names in grouping order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Base-table row indices of every group, in group order.
    pub fn group_rows(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Materialize each group as its own table.
    pub fn groups(&self) -> Result<Vec<DataFrame>> {
        self.groups.iter().map(|rows| self.slice(rows)).collect()
    }

    /// The base table with the grouping discarded.
    pub fn ungroup(&self) -> DataFrame {
        self.base.clone()
    }

    /// One row per group: the key columns followed by one column per aggregate.
    pub fn summarize<I>(&self, aggregates: I) -> Result<DataFrame>
    where
        I: IntoIterator<Item = Aggregate>,
    {
        let aggregates: Vec<Aggregate> = aggregates.into_iter().collect();
        let mut names: HashSet<&str> = self.keys.iter().map(String::as_str).collect();
        for agg in &aggregates {
            if !names.insert(agg.name()) {
                return Err(DataFrameError::duplicate_column(agg.name()));
            }
        }

        let first_rows = UInt32Array::from(
            self.groups
                .iter()
                .map(|rows| rows[0] as u32)
                .collect::<Vec<_>>(),
        );
        let mut columns = self
            .keys
            .iter()
            .map(|k| self.base.column(k)?.take(&first_rows))
            .collect::<Result<Vec<_>>>()?;

        let mut values: Vec<Vec<Scalar>> =
            vec![Vec::with_capacity(self.groups.len()); aggregates.len()];
        for rows in &self.groups {
            let group = self.slice(rows)?;
            for (agg, out) in aggregates.iter().zip(values.iter_mut()) {
                out.push(agg.evaluate(&group)?);
            }
        }
        for (agg, vals) in aggregates.iter().zip(values) {
            let ty = unify_types(agg.name(), &vals)?.unwrap_or(ColumnType::Text);
            columns.push(Column::from_scalars_typed(agg.name(), ty, &vals)?);
        }

        DataFrame::new(columns)
    }

    fn slice(&self, rows: &[usize]) -> Result<DataFrame> {
        let indices = UInt32Array::from(rows.iter().map(|&r| r as u32).collect::<Vec<_>>());
        self.base.take(&indices)
    }
}
