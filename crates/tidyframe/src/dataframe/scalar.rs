use std::fmt;

use arrow::datatypes::DataType;

use crate::infer::NA_LITERAL;

/// The four column variants a table can hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// 64-bit floating point.
    Double,
    /// 64-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// UTF-8 text.
    Text,
}

impl ColumnType {
    /// Returns `true` for `Double` and `Int`.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Double | ColumnType::Int)
    }

    /// The Arrow dtype used to store this variant.
    pub fn to_arrow(self) -> DataType {
        match self {
            ColumnType::Double => DataType::Float64,
            ColumnType::Int => DataType::Int64,
            ColumnType::Bool => DataType::Boolean,
            ColumnType::Text => DataType::Utf8,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Double => "Double",
            ColumnType::Int => "Int",
            ColumnType::Bool => "Bool",
            ColumnType::Text => "Text",
        };
        f.write_str(name)
    }
}

/// A single cell value, boxed for row-wise access.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    /// Missing value (`NA`).
    #[default]
    Missing,
    /// Floating point value.
    Double(f64),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Text(String),
}

impl Scalar {
    pub fn is_missing(&self) -> bool {
        matches!(self, Scalar::Missing)
    }

    /// The variant of a present value, `None` for `Missing`.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Scalar::Missing => None,
            Scalar::Double(_) => Some(ColumnType::Double),
            Scalar::Int(_) => Some(ColumnType::Int),
            Scalar::Bool(_) => Some(ColumnType::Bool),
            Scalar::Text(_) => Some(ColumnType::Text),
        }
    }

    /// Numeric value as `f64` (integers are widened).
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Scalar::Double(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Renders the wire form of a value: `NA` for missing, shortest round-trippable
/// representation for doubles (always with a fractional part or exponent), and
/// `NaN` / `Infinity` / `-Infinity` for non-finite doubles.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Missing => f.write_str(NA_LITERAL),
            Scalar::Double(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Double(v) => write!(f, "{v:?}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
        }
    }
}

impl From<()> for Scalar {
    fn from(_: ()) -> Self {
        Scalar::Missing
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Double(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl<T> From<Option<T>> for Scalar
where
    T: Into<Scalar>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Missing)
    }
}
