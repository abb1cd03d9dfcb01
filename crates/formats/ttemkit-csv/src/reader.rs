//! Delimited-table reader built on the `csv` crate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use ttemkit_core_common::{
    RawRecord, RawTable, SourcePosition, SpatialFormatReadError, SpatialFormatResult,
    TableReader,
};

/// Options for CSV reading
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Trim whitespace around fields and headers (default: true)
    pub trim: bool,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl CsvReaderOptions {
    /// Create new reader options with defaults
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

    /// Set whether fields are trimmed
    #[must_use]
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

/// CSV reader producing untyped tables.
///
/// The first row is the header. Rows shorter than the header are padded with
/// empty fields and longer rows are truncated, which tolerates sheets exported
/// with trailing empty columns.
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    options: CsvReaderOptions,
}

impl CsvReader {
    /// Creates a reader with the given options.
    #[must_use]
    pub fn new(options: CsvReaderOptions) -> Self {
        Self { options }
    }

    /// Reads CSV data from any [`Read`] source.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialFormatReadError::Parse`] when the data is not valid
    /// CSV (for example invalid UTF-8), positioned at the offending record.
    pub fn read_from<R: Read>(&self, input: R, context: &str) -> SpatialFormatResult<RawTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(&e, context))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| csv_error(&e, context))?;
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            fields.resize(headers.len(), String::new());
            if fields.iter().all(String::is_empty) {
                continue;
            }
            let mut raw = RawRecord::new(fields);
            if let Some(position) = record.position() {
                raw = raw.with_line(position.line());
            }
            records.push(raw);
        }

        log::debug!("Read {} CSV rows from {context}", records.len());
        Ok(RawTable::new(headers, records).with_source(context))
    }
}

impl TableReader for CsvReader {
    fn read_path(&self, path: &Path) -> SpatialFormatResult<RawTable> {
        let context = path.display().to_string();
        let file = File::open(path).map_err(|source| SpatialFormatReadError::Io {
            source,
            context: Some(context.clone()),
        })?;
        self.read_from(file, &context)
    }
}

fn csv_error(err: &csv::Error, context: &str) -> SpatialFormatReadError {
    let position = err.position().map(|pos| SourcePosition {
        line: Some(pos.line()),
        byte_offset: Some(pos.byte()),
        record: Some(pos.record()),
        ..SourcePosition::default()
    });
    SpatialFormatReadError::Parse {
        message: err.to_string(),
        position,
        context: Some(context.to_string()),
    }
}
