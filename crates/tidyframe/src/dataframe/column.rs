use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Float64Type, Int64Type};

use crate::dataframe::{ColumnType, Scalar};
use crate::{DataFrameError, Result};

/// Storage of a column, one immutable Arrow array per variant.
///
/// Cloning is cheap: Arrow buffers are reference counted, so derived tables share
/// untouched column data with their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Double(Float64Array),
    Int(Int64Array),
    Bool(BooleanArray),
    Text(StringArray),
}

impl ColumnData {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::Int(_) => ColumnType::Int,
            ColumnData::Bool(_) => ColumnType::Bool,
            ColumnData::Text(_) => ColumnType::Text,
        }
    }

    pub(crate) fn as_array(&self) -> &dyn Array {
        match self {
            ColumnData::Double(a) => a,
            ColumnData::Int(a) => a,
            ColumnData::Bool(a) => a,
            ColumnData::Text(a) => a,
        }
    }

    pub(crate) fn scalar_at(&self, row: usize) -> Scalar {
        if self.as_array().is_null(row) {
            return Scalar::Missing;
        }
        match self {
            ColumnData::Double(a) => Scalar::Double(a.value(row)),
            ColumnData::Int(a) => Scalar::Int(a.value(row)),
            ColumnData::Bool(a) => Scalar::Bool(a.value(row)),
            ColumnData::Text(a) => Scalar::Text(a.value(row).to_string()),
        }
    }
}

/// A named, typed, immutable sequence of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Construct a column from already-typed storage.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Construct a `Double` column; `None` marks a missing cell.
    pub fn doubles<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<f64>>,
    {
        let array: Float64Array = values.into_iter().map(Into::<Option<f64>>::into).collect();
        Self::new(name, ColumnData::Double(array))
    }

    /// Construct an `Int` column; `None` marks a missing cell.
    pub fn ints<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<i64>>,
    {
        let array: Int64Array = values.into_iter().map(Into::<Option<i64>>::into).collect();
        Self::new(name, ColumnData::Int(array))
    }

    /// Construct a `Bool` column; `None` marks a missing cell.
    pub fn bools<I, T>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<bool>>,
    {
        let array: BooleanArray = values.into_iter().map(Into::<Option<bool>>::into).collect();
        Self::new(name, ColumnData::Bool(array))
    }

    /// Construct a `Text` column without missing cells.
    pub fn texts<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let array: StringArray = values.into_iter().map(Some).collect();
        Self::new(name, ColumnData::Text(array))
    }

    /// Construct a `Text` column; `None` marks a missing cell.
    pub fn texts_opt<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let array: StringArray = values.into_iter().collect();
        Self::new(name, ColumnData::Text(array))
    }

    /// Build a column from boxed values, deriving the variant from them.
    ///
    /// Mixed `Int`/`Double` values widen to `Double`; a column without any present
    /// value becomes `Text`.
    pub fn from_scalars(name: impl Into<String>, values: &[Scalar]) -> Result<Self> {
        let name = name.into();
        let ty = unify_types(&name, values)?.unwrap_or(ColumnType::Text);
        Self::from_scalars_typed(name, ty, values)
    }

    /// Build a column of a fixed variant from boxed values.
    ///
    /// `Int` values are accepted into a `Double` column; any other variant mismatch
    /// is a `TypeMismatch`.
    pub fn from_scalars_typed(
        name: impl Into<String>,
        ty: ColumnType,
        values: &[Scalar],
    ) -> Result<Self> {
        let name = name.into();
        let mismatch = |v: &Scalar| {
            DataFrameError::type_mismatch(
                Some(name.clone()),
                ty.to_string(),
                v.column_type()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "Missing".to_string()),
            )
        };

        let data = match ty {
            ColumnType::Double => ColumnData::Double(
                values
                    .iter()
                    .map(|v| match v {
                        Scalar::Missing => Ok(None),
                        Scalar::Double(d) => Ok(Some(*d)),
                        Scalar::Int(i) => Ok(Some(*i as f64)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<Float64Array>>()?,
            ),
            ColumnType::Int => ColumnData::Int(
                values
                    .iter()
                    .map(|v| match v {
                        Scalar::Missing => Ok(None),
                        Scalar::Int(i) => Ok(Some(*i)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<Int64Array>>()?,
            ),
            ColumnType::Bool => ColumnData::Bool(
                values
                    .iter()
                    .map(|v| match v {
                        Scalar::Missing => Ok(None),
                        Scalar::Bool(b) => Ok(Some(*b)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<BooleanArray>>()?,
            ),
            ColumnType::Text => ColumnData::Text(
                values
                    .iter()
                    .map(|v| match v {
                        Scalar::Missing => Ok(None),
                        Scalar::Text(s) => Ok(Some(s.as_str())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<StringArray>>()?,
            ),
        };
        Ok(Self { name, data })
    }

    /// Repeat `value` `len` times. A missing value yields an all-missing `Text` column.
    pub fn broadcast(name: impl Into<String>, value: &Scalar, len: usize) -> Self {
        let name = name.into();
        let data = match value {
            Scalar::Missing => ColumnData::Text(StringArray::new_null(len)),
            Scalar::Double(v) => ColumnData::Double(Float64Array::from(vec![*v; len])),
            Scalar::Int(v) => ColumnData::Int(Int64Array::from(vec![*v; len])),
            Scalar::Bool(v) => ColumnData::Bool(BooleanArray::from(vec![*v; len])),
            Scalar::Text(v) => {
                ColumnData::Text(std::iter::repeat(Some(v.as_str())).take(len).collect())
            }
        };
        Self { name, data }
    }

    /// Wrap an Arrow array, widening narrower integer and float types.
    pub fn from_arrow(name: &str, array: ArrayRef) -> Result<Self> {
        let data = match array.data_type() {
            DataType::Float64 => ColumnData::Double(array.as_primitive::<Float64Type>().clone()),
            DataType::Int64 => ColumnData::Int(array.as_primitive::<Int64Type>().clone()),
            DataType::Boolean => ColumnData::Bool(array.as_boolean().clone()),
            DataType::Utf8 => ColumnData::Text(array.as_string::<i32>().clone()),
            DataType::Float16 | DataType::Float32 => {
                let cast = arrow::compute::cast(&array, &DataType::Float64)
                    .map_err(|source| DataFrameError::Arrow { source })?;
                ColumnData::Double(cast.as_primitive::<Float64Type>().clone())
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => {
                let cast = arrow::compute::cast(&array, &DataType::Int64)
                    .map_err(|source| DataFrameError::Arrow { source })?;
                ColumnData::Int(cast.as_primitive::<Int64Type>().clone())
            }
            DataType::LargeUtf8 | DataType::Utf8View => {
                let cast = arrow::compute::cast(&array, &DataType::Utf8)
                    .map_err(|source| DataFrameError::Arrow { source })?;
                ColumnData::Text(cast.as_string::<i32>().clone())
            }
            other => {
                return Err(DataFrameError::type_mismatch(
                    Some(name.to_string()),
                    "Float64, Int64, Boolean or Utf8",
                    other.to_string(),
                ))
            }
        };
        Ok(Self::new(name, data))
    }

    /// Convert this column into an Arrow array (shares the underlying buffers).
    pub fn to_arrow(&self) -> ArrayRef {
        match &self.data {
            ColumnData::Double(a) => Arc::new(a.clone()),
            ColumnData::Int(a) => Arc::new(a.clone()),
            ColumnData::Bool(a) => Arc::new(a.clone()),
            ColumnData::Text(a) => Arc::new(a.clone()),
        }
    }

    /// Return the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this column under a new name.
    pub fn rename(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: self.data.clone(),
        }
    }

    /// Return the typed storage.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Returns `true` for `Double` and `Int` columns.
    pub fn is_numeric(&self) -> bool {
        self.column_type().is_numeric()
    }

    /// Return the number of cells.
    pub fn len(&self) -> usize {
        self.data.as_array().len()
    }

    /// Returns `true` if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.data.as_array().null_count()
    }

    /// Return the value at `row`.
    pub fn get(&self, row: usize) -> Result<Scalar> {
        if row >= self.len() {
            return Err(DataFrameError::index_out_of_range(row, self.len()));
        }
        Ok(self.data.scalar_at(row))
    }

    /// Iterate over all cells as boxed values.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(move |row| self.data.scalar_at(row))
    }

    /// Apply `transform` to every present value; missing cells stay missing.
    ///
    /// The result variant is derived from the transformed values (widening to
    /// `Double` if any result is a double). When every cell is missing the source
    /// variant is kept.
    pub fn map<F>(&self, mut transform: F) -> Result<Column>
    where
        F: FnMut(Scalar) -> Scalar,
    {
        let values: Vec<Scalar> = self
            .iter()
            .map(|v| {
                if v.is_missing() {
                    Scalar::Missing
                } else {
                    transform(v)
                }
            })
            .collect();
        let ty = unify_types(&self.name, &values)?.unwrap_or_else(|| self.column_type());
        Self::from_scalars_typed(self.name.clone(), ty, &values)
    }

    /// Numeric values as `f64` (integers are widened).
    pub fn as_doubles(&self) -> Result<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Double(a) => Ok(a.iter().collect()),
            ColumnData::Int(a) => Ok(a.iter().map(|v| v.map(|i| i as f64)).collect()),
            other => Err(self.wrong_type("Double", other)),
        }
    }

    /// Values of an `Int` column.
    pub fn as_ints(&self) -> Result<Vec<Option<i64>>> {
        match &self.data {
            ColumnData::Int(a) => Ok(a.iter().collect()),
            other => Err(self.wrong_type("Int", other)),
        }
    }

    /// Values of a `Bool` column.
    pub fn as_bools(&self) -> Result<Vec<Option<bool>>> {
        match &self.data {
            ColumnData::Bool(a) => Ok(a.iter().collect()),
            other => Err(self.wrong_type("Bool", other)),
        }
    }

    /// Values of a `Text` column, borrowed from the column storage.
    pub fn as_texts(&self) -> Result<Vec<Option<&str>>> {
        match &self.data {
            ColumnData::Text(a) => Ok(a.iter().collect()),
            other => Err(self.wrong_type("Text", other)),
        }
    }

    pub(crate) fn take(&self, indices: &UInt32Array) -> Result<Column> {
        let taken = arrow::compute::take(self.data.as_array(), indices, None)
            .map_err(|source| DataFrameError::Arrow { source })?;
        Self::from_arrow(&self.name, taken)
    }

    pub(crate) fn filter(&self, mask: &BooleanArray) -> Result<Column> {
        let kept = arrow::compute::filter(self.data.as_array(), mask)
            .map_err(|source| DataFrameError::Arrow { source })?;
        Self::from_arrow(&self.name, kept)
    }

    fn wrong_type(&self, expected: &str, actual: &ColumnData) -> DataFrameError {
        DataFrameError::type_mismatch(
            Some(self.name.clone()),
            expected,
            actual.column_type().to_string(),
        )
    }
}

/// Common variant of the present values; `Int` and `Double` unify to `Double`.
pub(crate) fn unify_types(name: &str, values: &[Scalar]) -> Result<Option<ColumnType>> {
    let mut acc: Option<ColumnType> = None;
    for v in values {
        let Some(ty) = v.column_type() else {
            continue;
        };
        acc = Some(match (acc, ty) {
            (None, t) => t,
            (Some(a), t) if a == t => a,
            (Some(ColumnType::Int), ColumnType::Double)
            | (Some(ColumnType::Double), ColumnType::Int) => ColumnType::Double,
            (Some(a), t) => {
                return Err(DataFrameError::type_mismatch(
                    Some(name.to_string()),
                    a.to_string(),
                    t.to_string(),
                ))
            }
        });
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int32Array, UInt32Array};
    use arrow::datatypes::DataType;

    use super::Column;
    use crate::dataframe::{ColumnType, Scalar};
    use crate::DataFrameError;

    #[test]
    fn get_rejects_out_of_range() {
        let c = Column::ints("a", [1_i64, 2, 3]);
        assert_eq!(c.get(2).unwrap(), Scalar::Int(3));
        let err = c.get(3).unwrap_err();
        assert!(matches!(
            err,
            DataFrameError::IndexOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn from_scalars_widens_int_to_double() {
        let c = Column::from_scalars(
            "x",
            &[Scalar::Int(1), Scalar::Missing, Scalar::Double(2.5)],
        )
        .unwrap();
        assert_eq!(c.column_type(), ColumnType::Double);
        assert_eq!(c.as_doubles().unwrap(), vec![Some(1.0), None, Some(2.5)]);
    }

    #[test]
    fn from_scalars_rejects_mixed_variants() {
        let err = Column::from_scalars("x", &[Scalar::Int(1), Scalar::from("a")]).unwrap_err();
        match err {
            DataFrameError::TypeMismatch { column, .. } => {
                assert_eq!(column.as_deref(), Some("x"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_missing_scalars_become_text() {
        let c = Column::from_scalars("x", &[Scalar::Missing, Scalar::Missing]).unwrap();
        assert_eq!(c.column_type(), ColumnType::Text);
        assert_eq!(c.missing_count(), 2);
    }

    #[test]
    fn map_propagates_missing_and_widens() {
        let c = Column::ints("a", [Some(1_i64), None, Some(4)]);
        let halved = c
            .map(|v| Scalar::Double(v.as_double().unwrap_or_default() / 2.0))
            .unwrap();
        assert_eq!(halved.column_type(), ColumnType::Double);
        assert_eq!(halved.as_doubles().unwrap(), vec![Some(0.5), None, Some(2.0)]);

        let mut calls = 0;
        let same = c
            .map(|v| {
                calls += 1;
                v
            })
            .unwrap();
        assert_eq!(calls, 2);
        assert_eq!(same, c);
    }

    #[test]
    fn map_keeps_variant_when_all_missing() {
        let c = Column::bools("b", [None::<bool>, None]);
        let mapped = c.map(|_| Scalar::from("never")).unwrap();
        assert_eq!(mapped.column_type(), ColumnType::Bool);
    }

    #[test]
    fn from_arrow_widens_narrow_integers() {
        let a: ArrayRef = Arc::new(Int32Array::from(vec![Some(1), None]));
        let c = Column::from_arrow("n", a).unwrap();
        assert_eq!(c.column_type(), ColumnType::Int);
        assert_eq!(c.to_arrow().data_type(), &DataType::Int64);
        assert_eq!(c.as_ints().unwrap(), vec![Some(1), None]);
    }

    #[test]
    fn take_reorders_cells() {
        let c = Column::texts("t", ["a", "b", "c"]);
        let taken = c.take(&UInt32Array::from(vec![2, 0])).unwrap();
        assert_eq!(taken.as_texts().unwrap(), vec![Some("c"), Some("a")]);
        assert_eq!(taken.name(), "t");
    }

    #[test]
    fn typed_accessors_check_variant() {
        let c = Column::texts("t", ["a"]);
        assert!(matches!(
            c.as_ints().unwrap_err(),
            DataFrameError::TypeMismatch { .. }
        ));
        assert!(matches!(
            c.as_doubles().unwrap_err(),
            DataFrameError::TypeMismatch { .. }
        ));
    }
}
