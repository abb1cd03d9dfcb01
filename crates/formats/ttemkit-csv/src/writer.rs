//! CSV writer for point tables.
//!
//! Attribute columns are encoded by `arrow-csv`; the point geometry is appended
//! as a WKT text column so the file can be loaded as a delimited-text layer in
//! a GIS.

use std::io::Write as IoWrite;
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_csv::WriterBuilder;
use arrow_schema::{DataType, Field, Schema};
use ttemkit_core_common::{FormatWriteError, GeoTable, TableWriter};

use crate::geometry::build_wkt_column;

/// Options for CSV writing
#[derive(Debug, Clone)]
pub struct CsvWriterOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Whether to write header row (default: true)
    pub has_header: bool,
    /// Null value representation (default: empty string)
    pub null_value: String,
    /// Name of the appended WKT column; `None` disables it (default: `geometry`)
    pub geometry_column: Option<String>,
}

impl Default for CsvWriterOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            null_value: String::new(),
            geometry_column: Some("geometry".to_string()),
        }
    }
}

impl CsvWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write header row
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set null value representation
    #[must_use]
    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = null_value.into();
        self
    }

    /// Set or disable the WKT geometry column
    #[must_use]
    pub fn with_geometry_column(mut self, name: Option<String>) -> Self {
        self.geometry_column = name;
        self
    }
}

/// Returns the table's batch with a WKT column appended.
///
/// An existing column with the same name is replaced.
fn with_geometry(table: &GeoTable, column: &str) -> Result<RecordBatch, FormatWriteError> {
    let batch = table.batch();
    let schema = batch.schema();

    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    let mut columns = Vec::with_capacity(batch.num_columns() + 1);
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if field.name() != column {
            fields.push(Arc::clone(field));
            columns.push(Arc::clone(array));
        }
    }
    fields.push(Arc::new(Field::new(column, DataType::Utf8, true)));
    columns.push(build_wkt_column(table)?);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Write a point table to CSV format
///
/// # Errors
///
/// Returns an error if writing to the output fails, if CSV serialization
/// fails, or if a geometry cannot be encoded
pub fn write_csv<W: IoWrite>(
    writer: &mut W,
    table: &GeoTable,
    options: &CsvWriterOptions,
) -> Result<(), FormatWriteError> {
    let batch = match &options.geometry_column {
        Some(column) => with_geometry(table, column)?,
        None => table.batch().clone(),
    };

    let mut builder = WriterBuilder::new()
        .with_delimiter(options.delimiter)
        .with_header(options.has_header);

    if !options.null_value.is_empty() {
        builder = builder.with_null(options.null_value.clone());
    }

    let mut csv_writer = builder.build(writer);
    csv_writer.write(&batch)?;

    Ok(())
}

/// Write a point table to CSV bytes
///
/// # Errors
///
/// Returns an error if CSV serialization fails
pub fn write_csv_to_bytes(
    table: &GeoTable,
    options: &CsvWriterOptions,
) -> Result<Vec<u8>, FormatWriteError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, table, options)?;
    Ok(buffer)
}

/// [`TableWriter`] producing CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvTableWriter {
    options: CsvWriterOptions,
}

impl CsvTableWriter {
    /// Creates a writer with the given options.
    #[must_use]
    pub fn new(options: CsvWriterOptions) -> Self {
        Self { options }
    }
}

impl TableWriter for CsvTableWriter {
    fn write_table(
        &self,
        mut writer: &mut dyn IoWrite,
        table: &GeoTable,
    ) -> Result<(), FormatWriteError> {
        write_csv(&mut writer, table, &self.options)
    }
}
