use std::ops::Index;
use std::sync::Arc;

use crate::dataframe::Scalar;
use crate::{DataFrameError, Result};

/// One table row with its values boxed as heterogeneous scalars.
///
/// Rows produced from the same table share the column-name list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Scalar>,
}

impl Row {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Scalar>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Value of the named column.
    pub fn get(&self, name: &str) -> Result<&Scalar> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| DataFrameError::unknown_column(name))
    }

    /// Column names in table order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values in table order.
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Scalar> {
        self.values
    }
}

/// Panics when the column does not exist; use [`Row::get`] for a fallible lookup.
impl Index<&str> for Row {
    type Output = Scalar;

    fn index(&self, name: &str) -> &Scalar {
        match self.get(name) {
            Ok(v) => v,
            Err(_) => panic!("no column named '{name}' in row"),
        }
    }
}
