use crate::dataframe::{Column, ColumnData, Scalar};
use crate::{DataFrameError, Result};

/// Summary reducers.
///
/// With `remove_na == false` a single missing cell makes the result
/// `Scalar::Missing`. With `remove_na == true` missing cells are skipped, and a
/// reduction left without any present value fails with `MissingEmptyReduction`.
impl Column {
    /// Arithmetic mean, always a `Double`.
    pub fn mean(&self, remove_na: bool) -> Result<Scalar> {
        let Some(values) = self.present_doubles(remove_na, "mean")? else {
            return Ok(Scalar::Missing);
        };
        let sum: f64 = values.iter().sum();
        Ok(Scalar::Double(sum / values.len() as f64))
    }

    /// Sum; `Int` columns produce an `Int`, `Double` columns a `Double`.
    pub fn sum(&self, remove_na: bool) -> Result<Scalar> {
        if self.poisoned(remove_na) {
            return Ok(Scalar::Missing);
        }
        match self.data() {
            ColumnData::Int(a) => {
                let mut total: i64 = 0;
                let mut seen = false;
                for v in a.iter().flatten() {
                    seen = true;
                    total = total.checked_add(v).ok_or_else(|| {
                        DataFrameError::invalid_operation(format!(
                            "integer overflow computing sum of column '{}'",
                            self.name()
                        ))
                    })?;
                }
                if !seen {
                    return Err(self.empty("sum"));
                }
                Ok(Scalar::Int(total))
            }
            ColumnData::Double(a) => {
                let values: Vec<f64> = a.iter().flatten().collect();
                if values.is_empty() {
                    return Err(self.empty("sum"));
                }
                Ok(Scalar::Double(values.iter().sum()))
            }
            other => Err(DataFrameError::type_mismatch(
                Some(self.name().to_string()),
                "numeric",
                other.column_type().to_string(),
            )),
        }
    }

    /// Minimum under the natural order of the column variant.
    pub fn min(&self, remove_na: bool) -> Result<Scalar> {
        if self.poisoned(remove_na) {
            return Ok(Scalar::Missing);
        }
        let out = match self.data() {
            ColumnData::Double(a) => a.iter().flatten().min_by(f64::total_cmp).map(Scalar::Double),
            ColumnData::Int(a) => arrow::compute::min(a).map(Scalar::Int),
            ColumnData::Bool(a) => arrow::compute::min_boolean(a).map(Scalar::Bool),
            ColumnData::Text(a) => arrow::compute::min_string(a).map(Scalar::from),
        };
        out.ok_or_else(|| self.empty("min"))
    }

    /// Maximum under the natural order of the column variant.
    pub fn max(&self, remove_na: bool) -> Result<Scalar> {
        if self.poisoned(remove_na) {
            return Ok(Scalar::Missing);
        }
        let out = match self.data() {
            ColumnData::Double(a) => a.iter().flatten().max_by(f64::total_cmp).map(Scalar::Double),
            ColumnData::Int(a) => arrow::compute::max(a).map(Scalar::Int),
            ColumnData::Bool(a) => arrow::compute::max_boolean(a).map(Scalar::Bool),
            ColumnData::Text(a) => arrow::compute::max_string(a).map(Scalar::from),
        };
        out.ok_or_else(|| self.empty("max"))
    }

    /// Number of cells as an `Int`.
    ///
    /// With `remove_na` only present cells are counted; zero is a valid count, so
    /// this reducer never reports `MissingEmptyReduction`.
    pub fn count(&self, remove_na: bool) -> Scalar {
        if self.poisoned(remove_na) {
            return Scalar::Missing;
        }
        Scalar::Int((self.len() - self.missing_count()) as i64)
    }

    fn poisoned(&self, remove_na: bool) -> bool {
        !remove_na && self.missing_count() > 0
    }

    /// Present numeric values, or `None` when a missing cell poisons the result.
    fn present_doubles(&self, remove_na: bool, reduction: &str) -> Result<Option<Vec<f64>>> {
        if self.poisoned(remove_na) {
            return Ok(None);
        }
        let values: Vec<f64> = self.as_doubles()?.into_iter().flatten().collect();
        if values.is_empty() {
            return Err(self.empty(reduction));
        }
        Ok(Some(values))
    }

    fn empty(&self, reduction: &str) -> DataFrameError {
        DataFrameError::missing_empty_reduction(self.name(), reduction)
    }
}

#[cfg(test)]
mod tests {
    use crate::dataframe::{Column, Scalar};
    use crate::DataFrameError;

    #[test]
    fn missing_poisons_unless_removed() {
        let w = Column::ints("weight", [Some(55_i64), None, Some(88)]);
        assert_eq!(w.mean(false).unwrap(), Scalar::Missing);
        assert_eq!(w.mean(true).unwrap(), Scalar::Double(71.5));
        assert_eq!(w.sum(false).unwrap(), Scalar::Missing);
        assert_eq!(w.sum(true).unwrap(), Scalar::Int(143));
        assert_eq!(w.min(true).unwrap(), Scalar::Int(55));
        assert_eq!(w.max(true).unwrap(), Scalar::Int(88));
        assert_eq!(w.count(false), Scalar::Missing);
        assert_eq!(w.count(true), Scalar::Int(2));
    }

    #[test]
    fn empty_reduction_is_an_error() {
        let w = Column::doubles("w", [None::<f64>, None]);
        for err in [
            w.mean(true).unwrap_err(),
            w.sum(true).unwrap_err(),
            w.min(true).unwrap_err(),
            w.max(true).unwrap_err(),
        ] {
            assert!(matches!(err, DataFrameError::MissingEmptyReduction { .. }));
        }
        assert_eq!(w.count(true), Scalar::Int(0));

        let none = Column::doubles("w", Vec::<f64>::new());
        assert!(matches!(
            none.mean(false).unwrap_err(),
            DataFrameError::MissingEmptyReduction { .. }
        ));
    }

    #[test]
    fn min_max_follow_natural_order() {
        let t = Column::texts("t", ["pear", "apple", "fig"]);
        assert_eq!(t.min(false).unwrap(), Scalar::from("apple"));
        assert_eq!(t.max(false).unwrap(), Scalar::from("pear"));

        let d = Column::doubles("d", [2.5, -1.0, 7.25]);
        assert_eq!(d.min(false).unwrap(), Scalar::Double(-1.0));
        assert_eq!(d.max(false).unwrap(), Scalar::Double(7.25));
        assert_eq!(d.sum(false).unwrap(), Scalar::Double(8.75));
    }

    #[test]
    fn sum_of_text_is_type_mismatch() {
        let t = Column::texts("t", ["a"]);
        assert!(matches!(
            t.sum(true).unwrap_err(),
            DataFrameError::TypeMismatch { .. }
        ));
        assert!(matches!(
            t.mean(true).unwrap_err(),
            DataFrameError::TypeMismatch { .. }
        ));
    }
}
