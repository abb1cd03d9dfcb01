//! `ttemkit-core` is the core library of `ttemkit`, a toolkit for preparing
//! towed transient electromagnetic (tTEM) inversion results and borehole logs
//! for mapping and modelling.
//!
//! This crate includes:
//! - **Sounding pipeline**: [`SoundingFormatter`] cleans inverted resistivity
//!   layers, truncates them at the depth of investigation and resamples them to
//!   constant thickness.
//! - **Well pipeline**: [`WellFormatter`] joins lithology logs with collar
//!   locations, classifies grain size and reprojects points.
//! - **Water levels**: the [`water_level`] module fetches groundwater levels and
//!   site metadata from the USGS NWIS web services.
//! - **Export**: [`export`] writes point tables through the driver registry in
//!   [`drivers`].
//!
//! # Examples
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use ttemkit_core::{DoiSource, SoundingFormatter, SoundingOptions, SoundingSource, export};
//!
//! # fn main() -> ttemkit_core::Result<()> {
//! let options = SoundingOptions::new()
//!     .with_doi_source(DoiSource::File(PathBuf::from("survey_doi.xyz")))
//!     .with_crs("EPSG:32614");
//! let soundings = SoundingFormatter::new(
//!     vec![SoundingSource::File(PathBuf::from("survey.xyz"))],
//!     options,
//! )?;
//! export(&soundings.to_geo_table()?, Path::new("soundings.geojson"))?;
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod config;
pub mod crs;
pub mod doi;
pub mod drivers;
pub mod error;
pub mod operations;
pub mod resample;
pub mod sounding;
pub mod table;
pub mod types;
pub mod utils;
pub mod water_level;
pub mod well;

pub use columns::ColumnResolver;
pub use config::PipelineConfig;
pub use crs::{Crs, DEFAULT_CRS};
pub use doi::{DoiSource, DoiTable};
pub use error::{Result, TtemError};
pub use operations::export;
pub use resample::ResampleFactor;
pub use sounding::{SoundingFormatter, SoundingOptions, SoundingSource, StationSummary};
pub use ttemkit_core_common::GeoTable;
pub use types::{DropReport, GrainClass, MatchPolicy, SoundingRecord, WellRecord};
pub use water_level::{LevelKind, SiteLevel, SiteMetadata, WaterLevelReport};
pub use well::{WellFormatter, WellOptions, WellSource};
