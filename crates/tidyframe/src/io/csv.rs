use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow_csv::reader::{Format, ReaderBuilder};
use arrow_csv::WriterBuilder;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use regex::Regex;

use crate::infer::{TypeInferencer, NA_LITERAL};
use crate::io::options::{Compression, CsvReadOptions, CsvWriteOptions};
use crate::{DataFrame, DataFrameError, Result};

/// Read a CSV file eagerly into a `DataFrame` using default `CsvReadOptions`.
///
/// Files ending in `.gz` are decompressed transparently.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    read_csv_with_options(path, &CsvReadOptions::default())
}

/// Read a tab-separated file eagerly into a `DataFrame`.
pub fn read_tsv(path: impl AsRef<Path>) -> Result<DataFrame> {
    read_csv_with_options(path, &CsvReadOptions::tsv())
}

/// Read a CSV file eagerly into a `DataFrame` using the provided options.
pub fn read_csv_with_options(
    path: impl AsRef<Path>,
    options: &CsvReadOptions,
) -> Result<DataFrame> {
    let inferencer = options.validate()?;
    let path = path.as_ref();
    let gzip = options.compression.is_gzip(path);

    let file = File::open(path).map_err(|source| DataFrameError::io_with_path(source, path))?;
    let bytes = read_all(BufReader::new(file), gzip)
        .map_err(|source| DataFrameError::io_with_path(source, path))?;
    let df = parse_csv(bytes, options, &inferencer)?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        gzip,
        "read csv"
    );
    Ok(df)
}

/// Read CSV text from any reader. `Compression::Gzip` decompresses the stream;
/// `Auto` has no path to inspect and reads plain text.
pub fn read_csv_from_reader<R: Read>(reader: R, options: &CsvReadOptions) -> Result<DataFrame> {
    let inferencer = options.validate()?;
    let bytes = read_all(reader, options.compression == Compression::Gzip)
        .map_err(DataFrameError::io)?;
    parse_csv(bytes, options, &inferencer)
}

/// Write a `DataFrame` to a CSV file with a header row; missing cells are written as `NA`.
///
/// Paths ending in `.gz` are gzip-compressed. Re-reading restores the table except
/// when a `Bool` or `Text` column has only missing cells within the inference
/// sample: that column is committed to `Double` and its first value fails to parse.
pub fn write_csv(path: impl AsRef<Path>, df: &DataFrame) -> Result<()> {
    write_csv_with_options(path, df, &CsvWriteOptions::default())
}

/// Write a `DataFrame` to a tab-separated file.
pub fn write_tsv(path: impl AsRef<Path>, df: &DataFrame) -> Result<()> {
    write_csv_with_options(path, df, &CsvWriteOptions::tsv())
}

/// Write a `DataFrame` to a CSV file using the provided options.
pub fn write_csv_with_options(
    path: impl AsRef<Path>,
    df: &DataFrame,
    options: &CsvWriteOptions,
) -> Result<()> {
    options.validate()?;
    let path = path.as_ref();
    let gzip = options.compression.is_gzip(path);

    let file = File::create(path).map_err(|source| DataFrameError::io_with_path(source, path))?;
    let mut out = if gzip {
        let encoder = GzEncoder::new(BufWriter::new(file), flate2::Compression::default());
        write_csv_to_writer(encoder, df, options)?
            .finish()
            .map_err(|source| DataFrameError::io_with_path(source, path))?
    } else {
        write_csv_to_writer(BufWriter::new(file), df, options)?
    };
    out.flush()
        .map_err(|source| DataFrameError::io_with_path(source, path))?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        gzip,
        "wrote csv"
    );
    Ok(())
}

/// Write CSV text to `writer` and hand it back. Compression is the caller's concern.
///
/// A table without columns writes nothing.
pub fn write_csv_to_writer<W: Write>(
    writer: W,
    df: &DataFrame,
    options: &CsvWriteOptions,
) -> Result<W> {
    options.validate()?;
    if df.width() == 0 {
        return Ok(writer);
    }

    let batch = render_batch(df)?;
    let mut csv = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(options.delimiter)
        .build(writer);
    csv.write(&batch)
        .map_err(|source| DataFrameError::Arrow { source })?;
    Ok(csv.into_inner())
}

fn read_all<R: Read>(reader: R, gzip: bool) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if gzip {
        GzDecoder::new(reader).read_to_end(&mut bytes)?;
    } else {
        let mut reader = reader;
        reader.read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

fn csv_format(options: &CsvReadOptions) -> Result<Format> {
    let null_regex = Regex::new(&format!("^{NA_LITERAL}$")).map_err(|e| {
        DataFrameError::configuration("null_regex", format!("invalid regex: {e}"))
    })?;
    let mut format = Format::default()
        .with_header(true)
        .with_delimiter(options.delimiter)
        .with_null_regex(null_regex);
    if let Some(quote_char) = options.quote_char {
        format = format.with_quote(quote_char);
    }
    Ok(format)
}

fn parse_csv(
    bytes: Vec<u8>,
    options: &CsvReadOptions,
    inferencer: &TypeInferencer,
) -> Result<DataFrame> {
    let format = csv_format(options)?;

    // header only; every column is read as text and typed afterwards
    let (header, _) = format
        .infer_schema(Cursor::new(&bytes), Some(0))
        .map_err(|source| DataFrameError::Arrow { source })?;
    if header.fields().is_empty() {
        return Ok(DataFrame::empty());
    }
    let names: Vec<String> = header.fields().iter().map(|f| f.name().clone()).collect();
    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(n, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let reader = ReaderBuilder::new(schema)
        .with_format(format)
        .build(Cursor::new(bytes))
        .map_err(|source| DataFrameError::Arrow { source })?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| DataFrameError::Arrow { source })?;

    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let chunks: Vec<&dyn Array> = batches.iter().map(|b| b.column(idx).as_ref()).collect();
            let cells = if chunks.is_empty() {
                StringArray::from(Vec::<&str>::new())
            } else {
                arrow::compute::concat(&chunks)
                    .map_err(|source| DataFrameError::Arrow { source })?
                    .as_string::<i32>()
                    .clone()
            };
            inferencer.materialize(name, &cells)
        })
        .collect::<Result<Vec<_>>>()?;

    DataFrame::new(columns)
}

fn render_batch(df: &DataFrame) -> Result<RecordBatch> {
    let fields: Vec<Field> = df
        .names()
        .into_iter()
        .map(|n| Field::new(n, DataType::Utf8, false))
        .collect();
    let arrays: Vec<ArrayRef> = df
        .columns()
        .iter()
        .map(|c| {
            let cells: StringArray = c.iter().map(|v| Some(v.to_string())).collect();
            Arc::new(cells) as ArrayRef
        })
        .collect();
    let options = RecordBatchOptions::new().with_row_count(Some(df.height()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
        .map_err(|source| DataFrameError::Arrow { source })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{read_csv, read_csv_from_reader, read_csv_with_options, write_csv_to_writer};
    use crate::dataframe::{Column, ColumnType, Scalar};
    use crate::io::{CsvReadOptions, CsvWriteOptions};
    use crate::{DataFrame, DataFrameError};

    fn read_str(text: &str) -> crate::Result<DataFrame> {
        read_csv_from_reader(Cursor::new(text.as_bytes()), &CsvReadOptions::default())
    }

    #[test]
    fn csv_reads_and_infers_columns() {
        let df = read_str("name,age,weight,member\nMax,23,55.5,T\nFranz,NA,88,false\n").unwrap();
        assert_eq!(df.names(), vec!["name", "age", "weight", "member"]);
        assert_eq!(
            df.column_types(),
            vec![
                ColumnType::Text,
                ColumnType::Int,
                ColumnType::Double,
                ColumnType::Bool
            ]
        );
        assert_eq!(df.column("age").unwrap().get(1).unwrap(), Scalar::Missing);
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let df = read_str("name,city\n\"Doe, Max\",Berlin\n").unwrap();
        assert_eq!(df.column("name").unwrap().get(0).unwrap(), Scalar::from("Doe, Max"));
    }

    #[test]
    fn empty_input_is_empty_table() {
        let df = read_str("").unwrap();
        assert_eq!(df.width(), 0);
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn parse_error_past_sample_window() {
        let err = read_str("n\n1\n2\n3\n4\n5\nsix\n").unwrap_err();
        assert!(matches!(err, DataFrameError::Parse { row: 5, .. }));
    }

    #[test]
    fn writer_renders_missing_as_na() {
        let df = DataFrame::new(vec![
            Column::texts_opt("name", [Some("Max"), None]),
            Column::doubles("weight", [Some(82.0), Some(1.5)]),
        ])
        .unwrap();
        let out = write_csv_to_writer(Vec::new(), &df, &CsvWriteOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,weight\nMax,82.0\nNA,1.5\n"
        );

        let tsv = write_csv_to_writer(Vec::new(), &df, &CsvWriteOptions::tsv()).unwrap();
        assert!(String::from_utf8(tsv).unwrap().starts_with("name\tweight\n"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataFrameError::Io { path: Some(_), .. }));
    }

    #[test]
    fn csv_invalid_delimiter_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");

        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let options = CsvReadOptions::default().with_delimiter(b'\0');
        let err = read_csv_with_options(&path, &options).unwrap_err();
        assert!(matches!(err, DataFrameError::Configuration { .. }));
    }
}
