use std::path::Path;

use crate::infer::{TypeInferencer, DEFAULT_PEEK_SIZE};
use crate::{DataFrameError, Result};

/// Compression applied to a CSV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Gzip when the path ends in `.gz`, plain text otherwise.
    #[default]
    Auto,
    None,
    Gzip,
}

impl Compression {
    pub(crate) fn is_gzip(self, path: &Path) -> bool {
        match self {
            Compression::Auto => path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("gz")),
            Compression::None => false,
            Compression::Gzip => true,
        }
    }
}

/// Options for reading CSV files.
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter byte (e.g. `b','`).
    pub delimiter: u8,
    /// Quote character byte (defaults to `Some(b'\"')`).
    pub quote_char: Option<u8>,
    /// Number of leading cells sampled to infer each column's type.
    pub peek_size: usize,
    pub compression: Compression,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: Some(b'"'),
            peek_size: DEFAULT_PEEK_SIZE,
            compression: Compression::Auto,
        }
    }
}

impl CsvReadOptions {
    /// Defaults for tab-separated files.
    pub fn tsv() -> Self {
        Self::default().with_delimiter(b'\t')
    }

    /// Set `delimiter`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set `quote_char`.
    pub fn with_quote_char(mut self, quote_char: Option<u8>) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Set `peek_size`.
    pub fn with_peek_size(mut self, peek_size: usize) -> Self {
        self.peek_size = peek_size;
        self
    }

    /// Set `compression`.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub(crate) fn validate(&self) -> Result<TypeInferencer> {
        validate_delimiter(self.delimiter)?;
        if self.quote_char == Some(b'\0') {
            return Err(DataFrameError::configuration(
                "quote_char",
                "quote_char must not be NUL (0x00)",
            ));
        }
        if self.quote_char == Some(self.delimiter) {
            return Err(DataFrameError::configuration(
                "quote_char",
                "quote_char must differ from the delimiter",
            ));
        }
        TypeInferencer::new(self.peek_size)
    }
}

/// Options for writing CSV files.
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter byte (e.g. `b','`).
    pub delimiter: u8,
    pub compression: Compression,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            compression: Compression::Auto,
        }
    }
}

impl CsvWriteOptions {
    /// Defaults for tab-separated files.
    pub fn tsv() -> Self {
        Self::default().with_delimiter(b'\t')
    }

    /// Set `delimiter`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set `compression`.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_delimiter(self.delimiter)
    }
}

fn validate_delimiter(delimiter: u8) -> Result<()> {
    match delimiter {
        b'\0' => Err(DataFrameError::configuration(
            "delimiter",
            "delimiter must not be NUL (0x00)",
        )),
        b'\n' | b'\r' => Err(DataFrameError::configuration(
            "delimiter",
            "delimiter must not be a line terminator",
        )),
        _ => Ok(()),
    }
}
