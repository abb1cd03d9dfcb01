//! In-memory table types passed between readers, the formatters and writers.
//!
//! [`RawTable`] is the untyped result of reading a file: a header row and
//! string fields. [`GeoTable`] is the typed output of a formatter: an Arrow
//! [`RecordBatch`] plus the names of the two columns that carry the point
//! coordinates and the CRS they are expressed in.

use arrow_array::{Array, Float64Array, RecordBatch};
use arrow_schema::{DataType, SchemaRef};
use thiserror::Error;

/// One data row of a [`RawTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file, when known.
    pub line: Option<u64>,
    /// Field values in header order.
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Creates a record without source position.
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { line: None, fields }
    }

    /// Attaches the source line number.
    #[must_use]
    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    /// Returns the field at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

/// Untyped table: headers and string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names, trimmed.
    pub headers: Vec<String>,
    /// Data rows.
    pub records: Vec<RawRecord>,
    /// Human readable origin (usually a file path) used in error messages.
    pub source: Option<String>,
}

impl RawTable {
    /// Creates a table from headers and records.
    #[must_use]
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            records,
            source: None,
        }
    }

    /// Builds a table from string slices, mostly useful in tests and for
    /// in-memory sources.
    #[must_use]
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let records = rows
            .iter()
            .map(|row| RawRecord::new(row.iter().map(|f| (*f).to_string()).collect()))
            .collect();
        Self::new(headers.iter().map(|h| (*h).to_string()).collect(), records)
    }

    /// Records where the table came from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the column named `name`, compared case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Source description for error messages, `"<memory>"` when unknown.
    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or("<memory>")
    }
}

/// Errors raised when a batch cannot be used as a point table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoTableError {
    /// A coordinate column is absent from the batch.
    #[error("Coordinate column '{column}' not found in table")]
    MissingCoordinateColumn {
        /// Column that was looked up.
        column: String,
    },

    /// A coordinate column is not `Float64`.
    #[error("Coordinate column '{column}' must be Float64, found {data_type}")]
    CoordinateType {
        /// Column that was looked up.
        column: String,
        /// Actual data type, rendered for display.
        data_type: String,
    },
}

/// A formatted point table ready for export.
#[derive(Debug, Clone)]
pub struct GeoTable {
    batch: RecordBatch,
    x_column: String,
    y_column: String,
    crs: String,
    name: String,
}

impl GeoTable {
    /// Wraps `batch`, checking that the coordinate columns exist and hold
    /// `Float64` values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoTableError`] when a coordinate column is missing or has a
    /// different type.
    pub fn try_new(
        batch: RecordBatch,
        x_column: impl Into<String>,
        y_column: impl Into<String>,
        crs: impl Into<String>,
    ) -> Result<Self, GeoTableError> {
        let x_column = x_column.into();
        let y_column = y_column.into();
        for column in [&x_column, &y_column] {
            let field = batch.schema().field_with_name(column).cloned().map_err(|_| {
                GeoTableError::MissingCoordinateColumn {
                    column: column.clone(),
                }
            })?;
            if field.data_type() != &DataType::Float64 {
                return Err(GeoTableError::CoordinateType {
                    column: column.clone(),
                    data_type: field.data_type().to_string(),
                });
            }
        }
        Ok(Self {
            batch,
            x_column,
            y_column,
            crs: crs.into(),
            name: "features".to_string(),
        })
    }

    /// Sets the layer name used by writers that support one.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Underlying Arrow batch.
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consumes the table, returning the Arrow batch.
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Schema of the underlying batch.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Name of the column holding x (easting or longitude).
    #[must_use]
    pub fn x_column(&self) -> &str {
        &self.x_column
    }

    /// Name of the column holding y (northing or latitude).
    #[must_use]
    pub fn y_column(&self) -> &str {
        &self.y_column
    }

    /// CRS identifier of the coordinates, e.g. `EPSG:32614`.
    #[must_use]
    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Coordinates of row `row`, `None` when either value is null.
    #[must_use]
    pub fn xy(&self, row: usize) -> Option<(f64, f64)> {
        let x = self.coordinate_array(&self.x_column)?;
        let y = self.coordinate_array(&self.y_column)?;
        if row >= x.len() || x.is_null(row) || y.is_null(row) {
            return None;
        }
        Some((x.value(row), y.value(row)))
    }

    fn coordinate_array(&self, column: &str) -> Option<&Float64Array> {
        self.batch
            .column_by_name(column)?
            .as_any()
            .downcast_ref::<Float64Array>()
    }
}
