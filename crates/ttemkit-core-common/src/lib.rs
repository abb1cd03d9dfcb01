//! Common types and traits shared across `ttemkit` crates.
//!
//! This crate provides the abstractions that are shared between `ttemkit-core`
//! and the format crates (`ttemkit-xyz`, `ttemkit-csv`, `ttemkit-geojson`),
//! preventing circular dependencies.

pub mod drivers;
pub mod error;
pub mod io;
pub mod table;

// Re-export commonly used types
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use error::{FormatWriteError, SourcePosition, SpatialFormatReadError, SpatialFormatResult};
pub use io::{TableReader, TableWriter};
pub use table::{GeoTable, GeoTableError, RawRecord, RawTable};
