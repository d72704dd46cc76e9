mod csv;
mod options;
mod records;

/// CSV / TSV I/O helpers.
pub use csv::{
    read_csv, read_csv_from_reader, read_csv_with_options, read_tsv, write_csv,
    write_csv_to_writer, write_csv_with_options, write_tsv,
};
/// I/O option types.
pub use options::{Compression, CsvReadOptions, CsvWriteOptions};
/// Untyped record boundary between the CSV codec and typed tables.
pub use records::{from_records, to_records, RawRecords};
