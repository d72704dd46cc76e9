use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, AsArray, BooleanArray};
use arrow::datatypes::DataType;

use crate::dataframe::{Column, ColumnData, ColumnType, Scalar};
use crate::{DataFrameError, Result};

/// Right-hand side of an elementwise operation: another column or a scalar that is
/// broadcast to every row.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Column(&'a Column),
    Scalar(Scalar),
}

impl<'a> From<&'a Column> for Operand<'a> {
    fn from(c: &'a Column) -> Self {
        Operand::Column(c)
    }
}

impl From<Scalar> for Operand<'_> {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

macro_rules! operand_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand<'_> {
                fn from(v: $t) -> Self {
                    Operand::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

operand_from_scalar!(bool, i32, i64, f64, String, &str);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Cmp {
    Eq,
    Neq,
    Gt,
    Lt,
    Ge,
    Le,
}

/// Elementwise operators. Every operation is positional, fails with
/// `LengthMismatch` when a column operand has a different length, and yields a
/// missing cell wherever either input is missing.
impl Column {
    /// Addition; when `self` is `Text` the right operand is rendered and appended.
    #[allow(clippy::should_implement_trait)]
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        let rhs = rhs.into();
        if self.column_type() == ColumnType::Text {
            return self.concat(rhs);
        }
        self.arith(Arith::Add, rhs)
    }

    /// Subtraction.
    #[allow(clippy::should_implement_trait)]
    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.arith(Arith::Sub, rhs.into())
    }

    /// Multiplication.
    #[allow(clippy::should_implement_trait)]
    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.arith(Arith::Mul, rhs.into())
    }

    /// Division. Always produces a `Double` column.
    #[allow(clippy::should_implement_trait)]
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.arith(Arith::Div, rhs.into())
    }

    /// Elementwise `==` as a `Bool` column.
    pub fn eq<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Eq, rhs.into())
    }

    /// Elementwise `!=` as a `Bool` column.
    pub fn neq<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Neq, rhs.into())
    }

    /// Elementwise `>` as a `Bool` column.
    pub fn gt<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Gt, rhs.into())
    }

    /// Elementwise `<` as a `Bool` column.
    pub fn lt<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Lt, rhs.into())
    }

    /// Elementwise `>=` as a `Bool` column.
    pub fn ge<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Ge, rhs.into())
    }

    /// Elementwise `<=` as a `Bool` column.
    pub fn le<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        self.compare(Cmp::Le, rhs.into())
    }

    /// Boolean AND of two `Bool` operands.
    pub fn and<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        let (l, r) = self.bool_pair(rhs.into())?;
        let out = arrow::compute::kernels::boolean::and(&l, &r)
            .map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Column::new(self.name(), ColumnData::Bool(out)))
    }

    /// Boolean OR of two `Bool` operands.
    pub fn or<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<Column> {
        let (l, r) = self.bool_pair(rhs.into())?;
        let out = arrow::compute::kernels::boolean::or(&l, &r)
            .map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Column::new(self.name(), ColumnData::Bool(out)))
    }

    /// Boolean NOT.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Result<Column> {
        let ColumnData::Bool(b) = self.data() else {
            return Err(self.expected("Bool"));
        };
        let out = arrow::compute::kernels::boolean::not(b)
            .map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Column::new(self.name(), ColumnData::Bool(out)))
    }

    /// `true` where the cell is missing; never missing itself.
    pub fn is_missing(&self) -> Column {
        let array = self.data().as_array();
        let mask: BooleanArray = (0..array.len()).map(|i| Some(array.is_null(i))).collect();
        Column::new(self.name(), ColumnData::Bool(mask))
    }

    fn arith(&self, op: Arith, rhs: Operand<'_>) -> Result<Column> {
        let (rhs, rhs_type) = self.operand_array(rhs)?;
        let lhs_type = self.column_type();
        if !lhs_type.is_numeric() {
            return Err(self.expected("numeric"));
        }
        if let Some(t) = rhs_type {
            if !t.is_numeric() {
                return Err(DataFrameError::type_mismatch(
                    Some(self.name().to_string()),
                    "numeric",
                    t.to_string(),
                ));
            }
        }

        let widen = op == Arith::Div
            || lhs_type == ColumnType::Double
            || rhs_type == Some(ColumnType::Double);
        let target = if widen {
            DataType::Float64
        } else {
            DataType::Int64
        };
        let l = cast_to(&self.to_arrow(), &target)?;
        let r = cast_to(&rhs, &target)?;
        let l = l.as_ref();
        let r = r.as_ref();

        let out = match op {
            Arith::Add => arrow::compute::kernels::numeric::add(&l, &r),
            Arith::Sub => arrow::compute::kernels::numeric::sub(&l, &r),
            Arith::Mul => arrow::compute::kernels::numeric::mul(&l, &r),
            Arith::Div => arrow::compute::kernels::numeric::div(&l, &r),
        }
        .map_err(|source| DataFrameError::Arrow { source })?;
        Column::from_arrow(self.name(), out)
    }

    fn compare(&self, op: Cmp, rhs: Operand<'_>) -> Result<Column> {
        let (rhs, rhs_type) = self.operand_array(rhs)?;
        let lhs_type = self.column_type();

        let target = match rhs_type {
            None => lhs_type.to_arrow(),
            Some(t) if t == lhs_type => lhs_type.to_arrow(),
            Some(t) if t.is_numeric() && lhs_type.is_numeric() => DataType::Float64,
            Some(t) => {
                return Err(DataFrameError::type_mismatch(
                    Some(self.name().to_string()),
                    lhs_type.to_string(),
                    t.to_string(),
                ))
            }
        };
        let l = cast_to(&self.to_arrow(), &target)?;
        let r = cast_to(&rhs, &target)?;
        let l = l.as_ref();
        let r = r.as_ref();

        let out = match op {
            Cmp::Eq => arrow::compute::kernels::cmp::eq(&l, &r),
            Cmp::Neq => arrow::compute::kernels::cmp::neq(&l, &r),
            Cmp::Gt => arrow::compute::kernels::cmp::gt(&l, &r),
            Cmp::Lt => arrow::compute::kernels::cmp::lt(&l, &r),
            Cmp::Ge => arrow::compute::kernels::cmp::gt_eq(&l, &r),
            Cmp::Le => arrow::compute::kernels::cmp::lt_eq(&l, &r),
        }
        .map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Column::new(self.name(), ColumnData::Bool(out)))
    }

    fn concat(&self, rhs: Operand<'_>) -> Result<Column> {
        let ColumnData::Text(l) = self.data() else {
            return Err(self.expected("Text"));
        };
        let (rhs, _) = self.operand_array(rhs)?;
        let r = cast_to(&rhs, &DataType::Utf8)?;
        let out = arrow::compute::kernels::concat_elements::concat_elements_utf8(
            l,
            r.as_string::<i32>(),
        )
        .map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Column::new(self.name(), ColumnData::Text(out)))
    }

    fn bool_pair(&self, rhs: Operand<'_>) -> Result<(BooleanArray, BooleanArray)> {
        let ColumnData::Bool(l) = self.data() else {
            return Err(self.expected("Bool"));
        };
        let (rhs, rhs_type) = self.operand_array(rhs)?;
        if let Some(t) = rhs_type {
            if t != ColumnType::Bool {
                return Err(DataFrameError::type_mismatch(
                    Some(self.name().to_string()),
                    "Bool",
                    t.to_string(),
                ));
            }
        }
        let r = cast_to(&rhs, &DataType::Boolean)?;
        Ok((l.clone(), r.as_boolean().clone()))
    }

    /// Materialize the right operand as an array aligned with `self`.
    ///
    /// The returned type is `None` for a missing scalar, which adopts the left
    /// operand's type and makes every output cell missing.
    fn operand_array(&self, rhs: Operand<'_>) -> Result<(ArrayRef, Option<ColumnType>)> {
        match rhs {
            Operand::Column(c) => {
                if c.len() != self.len() {
                    return Err(DataFrameError::length_mismatch(
                        format!("elementwise operation on '{}'", self.name()),
                        self.len(),
                        c.len(),
                    ));
                }
                Ok((c.to_arrow(), Some(c.column_type())))
            }
            Operand::Scalar(Scalar::Missing) => Ok((
                new_null_array(&self.column_type().to_arrow(), self.len()),
                None,
            )),
            Operand::Scalar(s) => {
                let ty = s.column_type();
                Ok((Column::broadcast(self.name(), &s, self.len()).to_arrow(), ty))
            }
        }
    }

    fn expected(&self, expected: &str) -> DataFrameError {
        DataFrameError::type_mismatch(
            Some(self.name().to_string()),
            expected,
            self.column_type().to_string(),
        )
    }
}

fn cast_to(array: &ArrayRef, target: &DataType) -> Result<ArrayRef> {
    if array.data_type() == target {
        return Ok(Arc::clone(array));
    }
    arrow::compute::cast(array, target).map_err(|source| DataFrameError::Arrow { source })
}
