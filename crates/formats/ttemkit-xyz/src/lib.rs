//! Reader for metadata-prefixed whitespace tables.
//!
//! Aarhus Workbench exports tTEM inversions (`.xyz`) and depth-of-investigation
//! grids as plain text: a block of `/`-prefixed metadata lines, one header row
//! (itself usually prefixed with `/`), then whitespace separated data rows.
//! [`XyzReader`] locates the header with a regular expression and returns the
//! rows as an untyped [`RawTable`](ttemkit_core_common::RawTable).

pub mod reader;

pub use reader::{DOI_HEADER_PATTERN, SOUNDING_HEADER_PATTERN, XyzReader, XyzReaderOptions};
