//! Custom error types for `ttemkit` operations.
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! [`TtemError`] wraps one domain-specific enum per concern. The CLI turns these
//! into user-facing text with [`TtemError::user_message`] and
//! [`TtemError::recovery_suggestion`].

use std::path::PathBuf;

use arrow_schema::ArrowError;
use thiserror::Error;
use ttemkit_core_common::{FormatWriteError, GeoTableError, SourcePosition, SpatialFormatReadError};

/// Main error type for `ttemkit` operations.
///
/// This is the root error type that encompasses all domain-specific errors.
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum TtemError {
    /// Input tables are empty, incomplete or hold unparseable values
    #[error(transparent)]
    Input(#[from] InputError),

    /// A DOI or location lookup found no partner record
    #[error(transparent)]
    Join(#[from] JoinError),

    /// Driver-related errors (unknown extension, unsupported operation)
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// I/O errors (file read/write, path issues, permissions)
    #[error(transparent)]
    Io(#[from] IoError),

    /// USGS water-data service errors
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Coordinate reference system errors
    #[error(transparent)]
    Crs(#[from] CrsError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors raised by the format readers
    #[error(transparent)]
    Read(#[from] SpatialFormatReadError),

    /// Errors raised by the format writers
    #[error(transparent)]
    Write(#[from] FormatWriteError),

    /// Errors raised while wrapping a batch as a point table
    #[error(transparent)]
    Table(#[from] GeoTableError),

    /// Arrow errors while assembling output batches
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// Input validation errors.
///
/// These errors occur while turning raw rows into typed records.
#[derive(Debug, Error)]
pub enum InputError {
    /// No rows were available to process
    #[error("The {what} input is empty")]
    EmptyInput {
        /// Which input was empty (e.g. "sounding", "lithology")
        what: String,
    },

    /// A required column could not be found
    #[error("Required column '{column}' not found in {source_name}")]
    MissingColumn {
        /// The canonical column name
        column: String,
        /// Where the table came from
        source_name: String,
    },

    /// A field could not be converted to the expected type
    #[error("Invalid value '{value}' for column '{column}' in {source_name} at {position}: {reason}")]
    InvalidValue {
        /// The column name
        column: String,
        /// The offending raw text
        value: String,
        /// Where the table came from
        source_name: String,
        /// Row and column of the value
        position: SourcePosition,
        /// Why the value was rejected
        reason: String,
    },
}

/// Join errors.
///
/// Raised only under [`MatchPolicy::Strict`](crate::types::MatchPolicy);
/// lenient runs drop the group and record it in a
/// [`DropReport`](crate::types::DropReport) instead.
#[derive(Debug, Error)]
pub enum JoinError {
    /// No partner record exists for a join key
    #[error("No {kind} record matches {key}")]
    UnmatchedJoinKey {
        /// Which lookup failed (e.g. "DOI", "location")
        kind: String,
        /// The key that was looked up
        key: String,
    },
}

/// Driver-related errors.
///
/// These errors occur when selecting a format driver for export.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No driver is registered for the file extension
    #[error("Unsupported output format '{extension}' for '{path}'")]
    UnsupportedFormat {
        /// The extension that was looked up (may be empty)
        extension: String,
        /// The output path
        path: PathBuf,
    },

    /// Driver was not found in the registry
    #[error("Driver '{name}' not found. Available drivers: {available}")]
    NotFound {
        /// The requested driver name
        name: String,
        /// Comma-separated list of available drivers
        available: String,
    },

    /// Driver does not support the requested operation
    #[error("Driver '{driver}' does not support {operation}")]
    OperationNotSupported {
        /// The driver name
        driver: String,
        /// The operation that's not supported (e.g., "reading", "writing")
        operation: String,
    },
}

/// I/O related errors.
///
/// These errors occur during file or stream operations, including
/// reading, writing, and path validation.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "CSV", "XYZ")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },
}

/// Errors talking to the USGS water-data service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request failed or returned a non-success status
    #[error("Failed to fetch '{url}': {message}")]
    RemoteFetchFailure {
        /// Requested URL
        url: String,
        /// Transport or status description
        message: String,
    },

    /// The response could not be interpreted
    #[error("Could not parse {what}: {message}")]
    RemoteParse {
        /// What was being parsed (e.g. "inventory page")
        what: String,
        /// Why parsing failed
        message: String,
    },

    /// The well name contains no USGS site number
    #[error("'{name}' is not a USGS site name, e.g. '375006112554801'")]
    InvalidSiteName {
        /// The name that was given
        name: String,
    },
}

/// Coordinate reference system errors.
#[derive(Debug, Error)]
pub enum CrsError {
    /// The CRS identifier is not known
    #[error("Unsupported CRS '{crs}'")]
    UnsupportedCrs {
        /// The identifier that was given
        crs: String,
    },

    /// Transforming a coordinate failed
    #[error("Failed to transform ({x}, {y}) from {from} to {to}: {message}")]
    Transform {
        /// Source x
        x: f64,
        /// Source y
        y: f64,
        /// Source CRS
        from: String,
        /// Target CRS
        to: String,
        /// Description from the projection library
        message: String,
    },
}

/// Configuration errors.
///
/// These errors occur when options or configuration are invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Resampling factor is not a positive integer
    #[error("Invalid resample factor {value}: must be a positive integer")]
    InvalidFactor {
        /// The rejected factor
        value: i64,
    },

    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file '{path}': {message}")]
    Parse {
        /// The configuration file
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// Type alias for Results using `TtemError`.
pub type Result<T> = std::result::Result<T, TtemError>;

impl TtemError {
    /// Get a user-friendly error message with suggestions.
    ///
    /// This formats the error in a way that's helpful for end users,
    /// including context and actionable information.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Driver(e) => e.user_message(),
            Self::Io(e) => e.user_message(),
            Self::Input(e) => format!("Input error: {e}"),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Remote(e) => format!("USGS service error: {e}"),
            Self::Read(e) => format!("Read error: {e}"),
            Self::Write(e) => format!("Write error: {e}"),
            Self::Join(_) | Self::Crs(_) | Self::Table(_) | Self::Arrow(_) => self.to_string(),
        }
    }

    /// Get recovery suggestions if available.
    ///
    /// Returns helpful suggestions on how to fix or work around the error.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Driver(e) => e.recovery_suggestion(),
            Self::Io(e) => e.recovery_suggestion(),
            Self::Input(InputError::MissingColumn { .. }) => Some(
                "Check the header row, or add an alias for the column in the configuration file."
                    .to_string(),
            ),
            Self::Join(_) => Some(
                "Run without --strict to drop unmatched groups and report them instead."
                    .to_string(),
            ),
            Self::Crs(CrsError::UnsupportedCrs { .. }) => Some(
                "Use EPSG:4326, EPSG:4269, EPSG:4267, EPSG:3857, a UTM code (326xx, 327xx, 269xx) or a +proj= string."
                    .to_string(),
            ),
            Self::Remote(RemoteError::RemoteFetchFailure { .. }) => {
                Some("Check the Internet connection and the site number.".to_string())
            },
            _ => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// Recoverable errors might be fixed by retrying with different
    /// parameters or after the user takes some action.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Join(_) | Self::Remote(RemoteError::RemoteFetchFailure { .. })
        )
    }
}

impl DriverError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { name, available } => {
                format!(
                    "Driver '{name}' not found.\n\nAvailable drivers:\n{}",
                    available
                        .split(", ")
                        .map(|d| format!("  - {d}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                )
            },
            Self::OperationNotSupported { driver, operation } => {
                format!("The '{driver}' driver does not support {operation} yet.")
            },
            Self::UnsupportedFormat { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } | Self::UnsupportedFormat { .. } => {
                Some("Run 'ttemkit drivers' to see all available drivers.".to_string())
            },
            Self::OperationNotSupported { .. } => {
                Some("Export to .csv or .geojson instead.".to_string())
            },
        }
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            Self::Write { .. } => {
                Some("Check that the output directory exists and is writable.".to_string())
            },
            Self::Read { .. } => None,
        }
    }
}

/// Extension trait for adding I/O context to errors.
///
/// This trait provides convenient methods to wrap errors with file and format
/// context, creating more informative error messages.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            TtemError::Io(IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            TtemError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}

/// Helper to create `DriverError::NotFound` with available drivers.
#[must_use]
pub fn driver_not_found(name: &str) -> DriverError {
    use crate::drivers::get_driver_names;

    let available = get_driver_names().join(", ");
    DriverError::NotFound {
        name: name.to_string(),
        available,
    }
}
