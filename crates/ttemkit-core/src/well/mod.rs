//! Borehole lithology formatter.
//!
//! [`WellFormatter::new`] extracts lithology and location tables from CSV
//! sources, joins them by bore id, classifies the lithology keywords and keeps
//! the result as point records in a CRS. The joined records can then be
//! reprojected, resampled to constant thickness and exported.

pub mod classify;
pub mod join;

use std::fs;
use std::path::{Path, PathBuf};

use ttemkit_core_common::{GeoTable, RawTable};
use ttemkit_csv::{CsvReader, CsvReaderOptions};

use crate::columns::{ColumnResolver, field};
use crate::crs::{Crs, DEFAULT_CRS};
use crate::error::{InputError, IoErrorExt, Result};
use crate::resample::{ResampleFactor, resample_groups, sort_groups_by_depth};
use crate::table::well_batch;
use crate::types::{DropReport, GrainClass, MatchPolicy, WellRecord};
use crate::utils::read_input;

pub use join::{extract_lithology, extract_locations, spatial_join};

/// Where lithology and location tables come from.
#[derive(Debug, Clone)]
pub enum WellSource {
    /// One CSV file
    File(PathBuf),
    /// Every `.csv` file directly inside a directory
    Directory(PathBuf),
    /// An already parsed table
    Table(RawTable),
}

/// Options for [`WellFormatter`].
#[derive(Debug, Clone)]
pub struct WellOptions {
    /// CRS of the location coordinates
    pub crs: String,
    /// Header aliases
    pub columns: ColumnResolver,
    /// What to do with bores that have no location
    pub match_policy: MatchPolicy,
    /// CSV reader settings
    pub csv: CsvReaderOptions,
}

impl Default for WellOptions {
    fn default() -> Self {
        Self {
            crs: DEFAULT_CRS.to_string(),
            columns: ColumnResolver::default(),
            match_policy: MatchPolicy::default(),
            csv: CsvReaderOptions::default(),
        }
    }
}

impl WellOptions {
    /// Create new well options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CRS of the locations
    #[must_use]
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = crs.into();
        self
    }

    /// Set the column resolver
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnResolver) -> Self {
        self.columns = columns;
        self
    }

    /// Set the match policy for the location join
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Set the CSV reader options
    #[must_use]
    pub fn with_csv_options(mut self, csv: CsvReaderOptions) -> Self {
        self.csv = csv;
        self
    }
}

/// Joined and classified well intervals.
#[derive(Debug, Clone)]
pub struct WellFormatter {
    records: Vec<WellRecord>,
    drop_report: DropReport,
    crs: Crs,
}

impl WellFormatter {
    /// Loads `sources`, joins lithology with locations and classifies keywords.
    ///
    /// A table contributes lithology when its keyword column resolves and
    /// locations when its longitude column resolves; one table may do both.
    ///
    /// # Errors
    ///
    /// - [`InputError::EmptyInput`] without sources, lithology or locations
    /// - [`InputError::MissingColumn`] / [`InputError::InvalidValue`] for bad tables
    /// - [`JoinError::UnmatchedJoinKey`](crate::error::JoinError::UnmatchedJoinKey)
    ///   for a bore without location under [`MatchPolicy::Strict`]
    /// - [`CrsError::UnsupportedCrs`](crate::error::CrsError::UnsupportedCrs)
    pub fn new(sources: Vec<WellSource>, options: WellOptions) -> Result<Self> {
        let crs = Crs::parse(&options.crs)?;
        let tables = load_tables(sources, &CsvReader::new(options.csv.clone()))?;
        if tables.is_empty() {
            return Err(empty("well"));
        }

        let mut lithology = Vec::new();
        let mut locations = Vec::new();
        for table in &tables {
            if options.columns.resolve(field::KEYWORD, &table.headers).is_some() {
                lithology.extend(extract_lithology(table, &options.columns)?);
            }
            if options.columns.resolve(field::LONGITUDE, &table.headers).is_some() {
                locations.extend(extract_locations(table, &options.columns)?);
            }
        }
        if lithology.is_empty() {
            return Err(empty("lithology"));
        }
        if locations.is_empty() {
            return Err(empty("location"));
        }
        log::info!(
            "Read {} lithology intervals and {} locations from {} table(s)",
            lithology.len(),
            locations.len(),
            tables.len()
        );

        let (mut records, drop_report) =
            spatial_join(&lithology, &locations, options.match_policy)?;
        for record in &mut records {
            record.grain = GrainClass::from_keyword(&record.keyword);
        }

        Ok(Self {
            records,
            drop_report,
            crs,
        })
    }

    /// The joined records.
    #[must_use]
    pub fn records(&self) -> &[WellRecord] {
        &self.records
    }

    /// Bores dropped for lack of a location.
    #[must_use]
    pub fn drop_report(&self) -> &DropReport {
        &self.drop_report
    }

    /// The CRS of the point geometries.
    #[must_use]
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Transforms every point into `target` and refreshes the cached `X`/`Y`.
    ///
    /// The records are left untouched when any point fails to transform.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError`](crate::error::CrsError) for an unknown target or a
    /// failed transform.
    pub fn reproject(&mut self, target: &str) -> Result<()> {
        let target = Crs::parse(target)?;
        let mut records = self.records.clone();
        for record in &mut records {
            let (x, y) =
                self.crs
                    .transform_point(&target, record.geometry.x(), record.geometry.y())?;
            record.geometry = geo_types::Point::new(x, y);
            record.x = x;
            record.y = y;
        }
        log::info!("Reprojected {} records from {} to {}", records.len(), self.crs, target);
        self.records = records;
        self.crs = target;
        Ok(())
    }

    /// Constant-thickness copy of the records, grouped by bore and sorted by
    /// depth within each bore.
    #[must_use]
    pub fn resample(&self, factor: ResampleFactor) -> Vec<WellRecord> {
        let sorted = sort_groups_by_depth(&self.records, |r| r.bore.clone());
        resample_groups(&sorted, |r| r.bore.clone(), factor)
    }

    /// The joined records as a point table on `X`/`Y`.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be assembled.
    pub fn to_geo_table(&self) -> Result<GeoTable> {
        well_geo_table(&self.records, &self.crs)
    }
}

/// Wraps well records, e.g. the output of [`WellFormatter::resample`], as a
/// point table on `X`/`Y`.
///
/// # Errors
///
/// Returns an error if the batch cannot be assembled.
pub fn well_geo_table(records: &[WellRecord], crs: &Crs) -> Result<GeoTable> {
    let table = GeoTable::try_new(well_batch(records)?, "X", "Y", crs.name())?;
    Ok(table.with_name("wells"))
}

fn empty(what: &str) -> crate::error::TtemError {
    InputError::EmptyInput {
        what: what.to_string(),
    }
    .into()
}

fn load_tables(sources: Vec<WellSource>, reader: &CsvReader) -> Result<Vec<RawTable>> {
    let mut tables = Vec::new();
    for source in sources {
        match source {
            WellSource::File(path) => tables.push(read_input(reader, &path)?),
            WellSource::Directory(dir) => {
                for path in csv_files(&dir)? {
                    log::debug!("Reading {}", path.display());
                    tables.push(read_input(reader, &path)?);
                }
            },
            WellSource::Table(table) => tables.push(table),
        }
    }
    Ok(tables)
}

/// `.csv` files directly inside `dir`, sorted by path.
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_read_context("directory", dir)? {
        let path = entry.with_read_context("directory", dir)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
