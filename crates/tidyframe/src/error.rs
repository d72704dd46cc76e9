use std::path::PathBuf;

/// Errors returned by `tidyframe` operations.
#[derive(Debug, thiserror::Error)]
pub enum DataFrameError {
    /// Referenced column does not exist.
    #[error("unknown column: {name}")]
    UnknownColumn { name: String },

    /// A column, predicate result or operand does not have the expected length.
    #[error("length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Row index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A cell could not be parsed as the type committed for its column.
    #[error("cannot parse '{value}' as {expected} in column '{column}' (row {row})")]
    Parse {
        column: String,
        row: usize,
        value: String,
        expected: String,
    },

    /// Two columns with the same name would end up in one table.
    #[error("duplicate column name '{name}'")]
    DuplicateColumnName { name: String },

    /// A reducer had no present values left after excluding missing ones.
    #[error("cannot compute {reduction} of column '{column}': no present values")]
    MissingEmptyReduction { column: String, reduction: String },

    /// Data type mismatch (e.g. arithmetic on text or a non-boolean predicate).
    #[error(
        "type mismatch{column}: expected {expected}, got {actual}",
        column = column_display(.column)
    )]
    TypeMismatch {
        column: Option<String>,
        expected: String,
        actual: String,
    },

    /// Operation is not supported or invalid for the current inputs.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Invalid configuration option was provided.
    #[error("invalid configuration option '{option}': {message}")]
    Configuration { option: String, message: String },

    /// OS-level I/O error (optionally associated with a path).
    #[error("I/O error{path}: {source}", path = path_display(.path))]
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// Error originating from Arrow compute kernels or the CSV codec.
    #[error("arrow error: {source}")]
    Arrow { source: arrow::error::ArrowError },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, DataFrameError>;

impl DataFrameError {
    /// Create a missing column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn { name: name.into() }
    }

    /// Create a length mismatch error; `context` names the offending operation or column.
    pub fn length_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a parse error for a single cell.
    pub fn parse(
        column: impl Into<String>,
        row: usize,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Parse {
            column: column.into(),
            row,
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn duplicate_column(name: impl Into<String>) -> Self {
        Self::DuplicateColumnName { name: name.into() }
    }

    /// Create an empty-reduction error (e.g. `mean` over an all-missing column).
    pub fn missing_empty_reduction(
        column: impl Into<String>,
        reduction: impl Into<String>,
    ) -> Self {
        Self::MissingEmptyReduction {
            column: column.into(),
            reduction: reduction.into(),
        }
    }

    /// Create a type mismatch error with optional column context.
    pub fn type_mismatch(
        column: impl Into<Option<String>>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error without a path.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// Create an I/O error associated with a path.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }
}

fn column_display(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" for column '{c}'"))
        .unwrap_or_default()
}

fn path_display(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" for path '{}'", p.display()))
        .unwrap_or_default()
}
