//! CSV support for `ttemkit`.
//!
//! * [`reader`] loads lithology and location sheets into a
//!   [`RawTable`](ttemkit_core_common::RawTable).
//! * [`writer`] exports a [`GeoTable`](ttemkit_core_common::GeoTable) as CSV
//!   with the point geometry appended as a WKT column.

pub mod geometry;
pub mod reader;
pub mod writer;

pub use reader::{CsvReader, CsvReaderOptions};
pub use writer::{CsvTableWriter, CsvWriterOptions, write_csv, write_csv_to_bytes};
