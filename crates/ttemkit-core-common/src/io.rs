//! I/O traits for reading and writing survey tables.
//!
//! Format crates implement these traits; `ttemkit-core` selects an
//! implementation from the file extension and never touches the encoding
//! itself.

use std::io::Write;
use std::path::Path;

use crate::error::{FormatWriteError, SpatialFormatResult};
use crate::table::{GeoTable, RawTable};

/// Trait for loading a delimited or whitespace table into a [`RawTable`].
///
/// Readers do no type conversion: every field is returned as text so the
/// caller can report missing columns and bad values against its own schema.
pub trait TableReader: Send + Sync {
    /// Reads the table stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened, when no header row is
    /// found, or when the contents cannot be tokenised.
    fn read_path(&self, path: &Path) -> SpatialFormatResult<RawTable>;
}

/// Trait for serialising a [`GeoTable`] to an output stream.
pub trait TableWriter: Send + Sync {
    /// Writes `table` to `writer`.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination stream, usually a buffered file
    /// * `table` - Point table to serialise
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the bytes or a column type
    /// cannot be represented in the target format.
    fn write_table(&self, writer: &mut dyn Write, table: &GeoTable)
    -> Result<(), FormatWriteError>;
}
