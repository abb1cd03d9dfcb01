//! `GeoJSON` export for `ttemkit` point tables.
//!
//! Every row of a [`GeoTable`](ttemkit_core_common::GeoTable) becomes one
//! `Feature` with a `Point` geometry and the row's columns as properties.

pub mod properties;
pub mod writer;

pub use writer::{GeoJsonTableWriter, GeoJsonWriterOptions, to_feature_collection, write_geojson};
