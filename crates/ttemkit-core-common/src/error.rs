//! Error types shared by the format readers and writers.

use std::error::Error as StdError;
use std::fmt;

use arrow_schema::ArrowError;
use thiserror::Error;

/// A position within a source file, such as a row of a sounding export.
///
/// All indices are 1-based where possible to align with human expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Column (field) number in the source (1-based)
    pub column: Option<u64>,
    /// Byte offset from the start of the source
    pub byte_offset: Option<u64>,
    /// Logical record number reported by the parser
    pub record: Option<u64>,
}

impl SourcePosition {
    /// Position pointing at a single source line.
    #[must_use]
    pub fn at_line(line: u64) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    /// Returns true when the position does not contain any location metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_none()
            && self.column.is_none()
            && self.byte_offset.is_none()
            && self.record.is_none()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(line) = self.line {
            parts.push(format!("line {line}"));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {column}"));
        }
        if let Some(record) = self.record {
            parts.push(format!("record {record}"));
        }
        if let Some(byte) = self.byte_offset {
            parts.push(format!("byte {byte}"));
        }

        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Errors that can occur when loading tabular survey data.
#[derive(Debug)]
pub enum SpatialFormatReadError {
    /// An underlying I/O failure occurred.
    Io {
        /// The originating error.
        source: std::io::Error,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// Parsing failed for the input source.
    Parse {
        /// Human readable description of the failure.
        message: String,
        /// Optional position describing where the failure occurred.
        position: Option<SourcePosition>,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// No header row could be located in the source.
    MissingHeader {
        /// Description of the header that was expected.
        expected: String,
        /// Optional context describing what was being read.
        context: Option<String>,
    },
    /// Other error type not classified above.
    Other {
        /// Human readable description of the failure.
        message: String,
    },
}

impl SpatialFormatReadError {
    fn fmt_context(context: Option<&str>) -> String {
        context
            .map(|c| format!(" while reading {c}"))
            .unwrap_or_default()
    }

    fn fmt_position(position: Option<&SourcePosition>) -> String {
        position.map(|pos| format!(" at {pos}")).unwrap_or_default()
    }
}

impl fmt::Display for SpatialFormatReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFormatReadError::Io { source, context } => {
                write!(
                    f,
                    "I/O error{}: {source}",
                    Self::fmt_context(context.as_deref())
                )
            },
            SpatialFormatReadError::Parse {
                message,
                position,
                context,
            } => write!(
                f,
                "Parse error{}{}: {message}",
                Self::fmt_context(context.as_deref()),
                Self::fmt_position(position.as_ref())
            ),
            SpatialFormatReadError::MissingHeader { expected, context } => write!(
                f,
                "Header not found{}: expected {expected}",
                Self::fmt_context(context.as_deref())
            ),
            SpatialFormatReadError::Other { message } => f.write_str(message),
        }
    }
}

impl StdError for SpatialFormatReadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SpatialFormatReadError::Io { source, .. } => Some(source),
            SpatialFormatReadError::Parse { .. }
            | SpatialFormatReadError::MissingHeader { .. }
            | SpatialFormatReadError::Other { .. } => None,
        }
    }
}

impl From<std::io::Error> for SpatialFormatReadError {
    fn from(source: std::io::Error) -> Self {
        SpatialFormatReadError::Io {
            source,
            context: None,
        }
    }
}

/// Result type alias that uses [`SpatialFormatReadError`].
pub type SpatialFormatResult<T> = Result<T, SpatialFormatReadError>;

/// Errors raised while exporting a [`GeoTable`](crate::GeoTable).
#[derive(Error, Debug)]
pub enum FormatWriteError {
    /// Writing to the destination failed.
    #[error("I/O error while writing output: {0}")]
    Io(#[from] std::io::Error),

    /// An Arrow encoder rejected the batch.
    #[error("Arrow error while writing output: {0}")]
    Arrow(#[from] ArrowError),

    /// A row could not be turned into a geometry.
    #[error("Geometry error at row {row}: {message}")]
    Geometry {
        /// Zero-based row index in the batch.
        row: usize,
        /// Description of the failure.
        message: String,
    },

    /// A column has a type the writer cannot serialise.
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedColumn {
        /// Column name.
        column: String,
        /// Arrow data type, rendered for display.
        data_type: String,
    },

    /// JSON serialisation failed.
    #[error("Serialisation error while writing output: {message}")]
    Serialize {
        /// Description of the failure.
        message: String,
    },
}
