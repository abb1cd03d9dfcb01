//! tTEM sounding formatter.
//!
//! [`SoundingFormatter::new`] runs the whole cleaning pipeline once:
//!
//! 1. load and concatenate all sources,
//! 2. drop layers whose resistivity or thickness STD carries the sentinel,
//! 3. apply the layer, line and station exclusions,
//! 4. clip each location to its DOI elevation (when DOI sources are given),
//! 5. resample each location to constant thickness (when a factor is given),
//! 6. sort by station, line and layer and recompute `Elevation_End`.
//!
//! The formatter then answers queries on the cleaned layers.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use ttemkit_core_common::{GeoTable, RawTable};
use ttemkit_xyz::{DOI_HEADER_PATTERN, SOUNDING_HEADER_PATTERN, XyzReader, XyzReaderOptions};

use crate::columns::{FieldReader, require_exact};
use crate::crs::Crs;
use crate::doi::{DoiSource, DoiTable, apply_doi};
use crate::error::{ConfigError, InputError, Result};
use crate::resample::{ResampleFactor, resample_groups, sort_groups_by_depth};
use crate::table::{SOUNDING_COLUMNS, sounding_batch, summary_batch};
use crate::types::{DropReport, MatchPolicy, SoundingRecord, std_or_sentinel};
use crate::utils::read_input;

/// Where sounding layers come from.
#[derive(Debug, Clone)]
pub enum SoundingSource {
    /// An Aarhus Workbench `.xyz` export
    File(PathBuf),
    /// An already parsed table with the sounding columns
    Table(RawTable),
    /// Ready-made records
    Records(Vec<SoundingRecord>),
}

/// Options for [`SoundingFormatter`].
#[derive(Debug, Clone)]
pub struct SoundingOptions {
    /// DOI exports; no DOI clipping when empty
    pub doi_sources: Vec<DoiSource>,
    /// Layer numbers to remove
    pub exclude_layers: Vec<i64>,
    /// Line numbers to remove
    pub exclude_lines: Vec<i64>,
    /// Station ids to remove
    pub exclude_ids: Vec<i64>,
    /// Constant-thickness resampling
    pub resample: Option<ResampleFactor>,
    /// What to do with locations that have no DOI value
    pub match_policy: MatchPolicy,
    /// Header marker of sounding exports
    pub sounding_header: String,
    /// Header marker of DOI exports
    pub doi_header: String,
    /// Projected CRS of `UTMX`/`UTMY`, e.g. `EPSG:32612`
    pub crs: Option<String>,
}

impl Default for SoundingOptions {
    fn default() -> Self {
        Self {
            doi_sources: Vec::new(),
            exclude_layers: Vec::new(),
            exclude_lines: Vec::new(),
            exclude_ids: Vec::new(),
            resample: None,
            match_policy: MatchPolicy::default(),
            sounding_header: SOUNDING_HEADER_PATTERN.to_string(),
            doi_header: DOI_HEADER_PATTERN.to_string(),
            crs: None,
        }
    }
}

impl SoundingOptions {
    /// Create new sounding options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a DOI source
    #[must_use]
    pub fn with_doi_source(mut self, source: DoiSource) -> Self {
        self.doi_sources.push(source);
        self
    }

    /// Set the excluded layer numbers
    #[must_use]
    pub fn with_layer_exclusions(mut self, layers: impl IntoIterator<Item = i64>) -> Self {
        self.exclude_layers = layers.into_iter().collect();
        self
    }

    /// Set the excluded line numbers
    #[must_use]
    pub fn with_line_exclusions(mut self, lines: impl IntoIterator<Item = i64>) -> Self {
        self.exclude_lines = lines.into_iter().collect();
        self
    }

    /// Set the excluded station ids
    #[must_use]
    pub fn with_id_exclusions(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.exclude_ids = ids.into_iter().collect();
        self
    }

    /// Resample to `factor` bins per unit depth
    #[must_use]
    pub fn with_resample(mut self, factor: ResampleFactor) -> Self {
        self.resample = Some(factor);
        self
    }

    /// Set the match policy for DOI lookups
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Set the sounding header marker
    #[must_use]
    pub fn with_sounding_header(mut self, pattern: impl Into<String>) -> Self {
        self.sounding_header = pattern.into();
        self
    }

    /// Set the DOI header marker
    #[must_use]
    pub fn with_doi_header(mut self, pattern: impl Into<String>) -> Self {
        self.doi_header = pattern.into();
        self
    }

    /// Set the CRS of the sounding coordinates
    #[must_use]
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }
}

/// Per-station aggregate of the cleaned layers.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary {
    /// Station id
    pub id: i64,
    /// Deepest layer bottom
    pub depth_bottom_max: f64,
    /// Highest cell top
    pub elevation_cell_max: f64,
    /// Lowest cell bottom
    pub elevation_end_min: f64,
    /// Minimum resistivity
    pub resistivity_min: f64,
    /// Maximum resistivity
    pub resistivity_max: f64,
    /// Mean resistivity
    pub resistivity_mean: f64,
    /// Mean easting
    pub utmx_mean: f64,
    /// Mean northing
    pub utmy_mean: f64,
}

/// Cleaned sounding layers.
#[derive(Debug, Clone)]
pub struct SoundingFormatter {
    records: Vec<SoundingRecord>,
    drop_report: DropReport,
    crs: Option<Crs>,
}

impl SoundingFormatter {
    /// Loads `sources` and runs the cleaning pipeline.
    ///
    /// # Errors
    ///
    /// - [`InputError::EmptyInput`] when the sources hold no rows
    /// - [`InputError::MissingColumn`] / [`InputError::InvalidValue`] for bad tables
    /// - [`JoinError::UnmatchedJoinKey`](crate::error::JoinError::UnmatchedJoinKey)
    ///   for a location without DOI under [`MatchPolicy::Strict`]
    /// - [`ConfigError::InvalidOption`] for a bad header pattern
    /// - [`CrsError::UnsupportedCrs`](crate::error::CrsError::UnsupportedCrs)
    ///   for an unknown CRS
    pub fn new(sources: Vec<SoundingSource>, options: SoundingOptions) -> Result<Self> {
        let crs = match options.crs.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(Crs::parse(name)?),
            _ => None,
        };

        let reader = xyz_reader("sounding header", &options.sounding_header)?;
        let mut records = load_sources(sources, &reader)?;
        if records.is_empty() {
            return Err(InputError::EmptyInput {
                what: "sounding".to_string(),
            }
            .into());
        }
        let loaded = records.len();

        records.retain(SoundingRecord::is_valid);
        log::info!(
            "Removed {} of {loaded} layers with an unresolved standard deviation",
            loaded - records.len()
        );

        records = exclude(records, &options.exclude_layers, |r| r.layer_no);
        records = exclude(records, &options.exclude_lines, |r| r.line_no);
        records = exclude(records, &options.exclude_ids, |r| r.id);

        let mut drop_report = DropReport::default();
        if !options.doi_sources.is_empty() {
            let doi_reader = xyz_reader("DOI header", &options.doi_header)?;
            let doi = DoiTable::from_sources(&options.doi_sources, &doi_reader)?;
            let (kept, report) = apply_doi(&records, &doi, options.match_policy)?;
            records = kept;
            drop_report = report;
        }

        if let Some(factor) = options.resample {
            let sorted = sort_groups_by_depth(&records, SoundingRecord::xy_key);
            records = resample_groups(&sorted, SoundingRecord::xy_key, factor);
            log::info!(
                "Resampled to {} layers at {} bins per unit depth",
                records.len(),
                factor.get()
            );
        }

        records.sort_by_key(|r| (r.id, r.line_no, r.layer_no));
        for record in &mut records {
            record.recompute_elevation_end();
        }

        Ok(Self {
            records,
            drop_report,
            crs,
        })
    }

    /// The cleaned layers.
    #[must_use]
    pub fn records(&self) -> &[SoundingRecord] {
        &self.records
    }

    /// Locations dropped for lack of a DOI value.
    #[must_use]
    pub fn drop_report(&self) -> &DropReport {
        &self.drop_report
    }

    /// The CRS of the coordinates, if one was given.
    #[must_use]
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Per-station aggregates ordered by station id.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summary(&self) -> Vec<StationSummary> {
        let mut stations: BTreeMap<i64, Vec<&SoundingRecord>> = BTreeMap::new();
        for record in &self.records {
            stations.entry(record.id).or_default().push(record);
        }

        stations
            .into_iter()
            .map(|(id, layers)| {
                let n = layers.len() as f64;
                let max = |f: fn(&SoundingRecord) -> f64| {
                    layers.iter().map(|r| f(r)).fold(f64::NEG_INFINITY, f64::max)
                };
                let min = |f: fn(&SoundingRecord) -> f64| {
                    layers.iter().map(|r| f(r)).fold(f64::INFINITY, f64::min)
                };
                let mean =
                    |f: fn(&SoundingRecord) -> f64| layers.iter().map(|r| f(r)).sum::<f64>() / n;

                StationSummary {
                    id,
                    depth_bottom_max: max(|r| r.depth_bottom),
                    elevation_cell_max: max(|r| r.elevation_cell),
                    elevation_end_min: min(|r| r.elevation_end),
                    resistivity_min: min(|r| r.resistivity),
                    resistivity_max: max(|r| r.resistivity),
                    resistivity_mean: mean(|r| r.resistivity),
                    utmx_mean: mean(|r| r.utmx),
                    utmy_mean: mean(|r| r.utmy),
                }
            })
            .collect()
    }

    /// The layers as a point table on `UTMX`/`UTMY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be assembled.
    pub fn to_geo_table(&self) -> Result<GeoTable> {
        let table = GeoTable::try_new(
            sounding_batch(&self.records)?,
            "UTMX",
            "UTMY",
            self.crs_name(),
        )?;
        Ok(table.with_name("soundings"))
    }

    /// The station summary as a point table on `UTMX_mean`/`UTMY_mean`.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch cannot be assembled.
    pub fn summary_geo_table(&self) -> Result<GeoTable> {
        let table = GeoTable::try_new(
            summary_batch(&self.summary())?,
            "UTMX_mean",
            "UTMY_mean",
            self.crs_name(),
        )?;
        Ok(table.with_name("stations"))
    }

    fn crs_name(&self) -> String {
        self.crs.as_ref().map(|c| c.name().to_string()).unwrap_or_default()
    }
}

fn xyz_reader(option: &str, pattern: &str) -> Result<XyzReader> {
    let options =
        XyzReaderOptions::with_header_pattern(pattern).map_err(|e| ConfigError::InvalidOption {
            option: option.to_string(),
            message: e.to_string(),
        })?;
    Ok(XyzReader::new(options))
}

fn load_sources(sources: Vec<SoundingSource>, reader: &XyzReader) -> Result<Vec<SoundingRecord>> {
    let mut records = Vec::new();
    for source in sources {
        match source {
            SoundingSource::File(path) => {
                let table = read_input(reader, &path)?;
                log::info!("Read {} sounding rows from {}", table.len(), path.display());
                records.extend(parse_table(&table)?);
            },
            SoundingSource::Table(table) => records.extend(parse_table(&table)?),
            SoundingSource::Records(list) => records.extend(list),
        }
    }
    Ok(records)
}

/// Converts a raw sounding table into records.
///
/// `Elevation_End` is derived, so the column is not required.
///
/// # Errors
///
/// Returns [`InputError::MissingColumn`] or [`InputError::InvalidValue`].
pub fn parse_table(table: &RawTable) -> Result<Vec<SoundingRecord>> {
    let mut index = [0usize; 13];
    for (slot, name) in index.iter_mut().zip(SOUNDING_COLUMNS) {
        *slot = require_exact(table, name)?;
    }
    let [id, line, layer, x, y, elev, res, res_std, cond, top, bottom, thick, thick_std] = index;

    (0..table.len())
        .map(|row| {
            let f = FieldReader::new(table, row);
            let mut record = SoundingRecord {
                id: f.i64(id)?,
                line_no: f.i64(line)?,
                layer_no: f.i64(layer)?,
                utmx: f.f64(x)?,
                utmy: f.f64(y)?,
                elevation_cell: f.f64(elev)?,
                resistivity: f.f64(res)?,
                resistivity_std: std_or_sentinel(f.f64(res_std)?),
                conductivity: f.f64(cond)?,
                depth_top: f.f64(top)?,
                depth_bottom: f.f64(bottom)?,
                thickness: f.f64(thick)?,
                thickness_std: std_or_sentinel(f.f64(thick_std)?),
                elevation_end: 0.0,
            };
            record.recompute_elevation_end();
            Ok(record)
        })
        .collect()
}

fn exclude(
    mut records: Vec<SoundingRecord>,
    values: &[i64],
    field: fn(&SoundingRecord) -> i64,
) -> Vec<SoundingRecord> {
    if values.is_empty() {
        return records;
    }
    let values: HashSet<i64> = values.iter().copied().collect();
    let before = records.len();
    records.retain(|r| !values.contains(&field(r)));
    log::debug!("Exclusion removed {} layers", before - records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtemError;
    use crate::types::DoiRecord;

    const EPS: f64 = 1e-9;

    fn layer(id: i64, line: i64, layer_no: i64, top: f64, thickness: f64) -> SoundingRecord {
        SoundingRecord {
            id,
            line_no: line,
            layer_no,
            utmx: 500.0 + id as f64,
            utmy: 4000.0,
            elevation_cell: 1500.0 - top,
            resistivity: 10.0 * layer_no as f64,
            resistivity_std: Some(1.05),
            conductivity: 100.0 / layer_no as f64,
            depth_top: top,
            depth_bottom: top + thickness,
            thickness,
            thickness_std: Some(1.1),
            elevation_end: 0.0,
        }
    }

    fn station(id: i64, line: i64) -> Vec<SoundingRecord> {
        vec![
            layer(id, line, 1, 0.0, 1.0),
            layer(id, line, 2, 1.0, 2.0),
            layer(id, line, 3, 3.0, 3.0),
        ]
    }

    #[test]
    fn test_sentinel_rows_never_reach_output() {
        let mut records = station(1, 100);
        records[1].thickness_std = None;
        records[2].resistivity_std = None;

        let formatter =
            SoundingFormatter::new(vec![SoundingSource::Records(records)], SoundingOptions::new())
                .unwrap();
        assert_eq!(formatter.records().len(), 1);
        assert!(formatter.records().iter().all(SoundingRecord::is_valid));
    }

    #[test]
    fn test_sentinel_parsed_from_table() {
        let table = RawTable::from_rows(
            &SOUNDING_COLUMNS,
            &[
                &[
                    "1", "100", "1", "500", "4000", "1500", "10", "1.05", "100", "0", "1", "1",
                    "9999", "1499",
                ],
                &[
                    "1", "100", "2", "500", "4000", "1499", "20", "1.05", "50", "1", "3", "2",
                    "1.1", "1497",
                ],
            ],
        );
        let records = parse_table(&table).unwrap();
        assert_eq!(records[0].thickness_std, None);
        assert_eq!(records[1].thickness_std, Some(1.1));

        let formatter =
            SoundingFormatter::new(vec![SoundingSource::Table(table)], SoundingOptions::new())
                .unwrap();
        assert_eq!(formatter.records().len(), 1);
        assert_eq!(formatter.records()[0].layer_no, 2);
    }

    #[test]
    fn test_exclusions_commute() {
        let mut records = station(1, 100);
        records.extend(station(2, 200));
        records.extend(station(3, 100));

        let a = exclude(exclude(records.clone(), &[1], |r| r.layer_no), &[200], |r| r.line_no);
        let b = exclude(exclude(records, &[200], |r| r.line_no), &[1], |r| r.layer_no);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_exclusion_options_filter_output() {
        let mut records = station(1, 100);
        records.extend(station(2, 200));
        records.extend(station(3, 300));

        let options = SoundingOptions::new()
            .with_layer_exclusions([1])
            .with_line_exclusions([200])
            .with_id_exclusions([3]);
        let formatter = SoundingFormatter::new(vec![SoundingSource::Records(records)], options)
            .unwrap();

        let kept: Vec<(i64, i64)> = formatter
            .records()
            .iter()
            .map(|r| (r.id, r.layer_no))
            .collect();
        assert_eq!(kept, vec![(1, 2), (1, 3)]);
    }

    #[test]
    fn test_output_sorted_and_elevation_end_recomputed() {
        let mut records = station(2, 100);
        records.extend(station(1, 100));
        records.reverse();

        let formatter =
            SoundingFormatter::new(vec![SoundingSource::Records(records)], SoundingOptions::new())
                .unwrap();
        let keys: Vec<(i64, i64)> = formatter
            .records()
            .iter()
            .map(|r| (r.id, r.layer_no))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]);
        for r in formatter.records() {
            assert!((r.elevation_end - (r.elevation_cell - r.thickness)).abs() < EPS);
        }
    }

    #[test]
    fn test_summary_aggregates() {
        let formatter =
            SoundingFormatter::new(vec![SoundingSource::Records(station(7, 100))], SoundingOptions::new())
                .unwrap();
        let summary = formatter.summary();
        assert_eq!(summary.len(), 1);

        let s = &summary[0];
        assert_eq!(s.id, 7);
        assert!((s.resistivity_min - 10.0).abs() < EPS);
        assert!((s.resistivity_max - 30.0).abs() < EPS);
        assert!((s.resistivity_mean - 20.0).abs() < EPS);
        assert!((s.depth_bottom_max - 6.0).abs() < EPS);
        assert!((s.elevation_cell_max - 1500.0).abs() < EPS);
        assert!((s.elevation_end_min - 1494.0).abs() < EPS);
        assert!((s.utmx_mean - 507.0).abs() < EPS);
    }

    #[test]
    fn test_doi_and_resample() {
        let doi = DoiSource::Records(vec![DoiRecord {
            x: 501.0,
            y: 4000.0,
            value: 1498.0,
        }]);
        let options = SoundingOptions::new()
            .with_doi_source(doi)
            .with_resample(ResampleFactor::new(1).unwrap());

        let mut records = station(1, 100);
        records.extend(station(2, 100));
        let formatter = SoundingFormatter::new(vec![SoundingSource::Records(records)], options)
            .unwrap();

        // Station 1 keeps layers 1 and 2 (cell tops 1500 and 1499), resampled
        // into 1 + 2 bins; station 2 has no DOI value.
        assert_eq!(formatter.records().len(), 3);
        assert!(formatter.records().iter().all(|r| r.id == 1));
        assert_eq!(formatter.drop_report().total_rows(), 3);
        assert!((formatter.records()[2].depth_top - 2.0).abs() < EPS);
        assert!((formatter.records()[2].thickness - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_input() {
        let err = SoundingFormatter::new(Vec::new(), SoundingOptions::new()).unwrap_err();
        assert!(matches!(err, TtemError::Input(InputError::EmptyInput { .. })));
    }

    #[test]
    fn test_missing_column() {
        let table = RawTable::from_rows(&["ID", "Line_No"], &[&["1", "2"]]);
        let err = SoundingFormatter::new(vec![SoundingSource::Table(table)], SoundingOptions::new())
            .unwrap_err();
        match err {
            TtemError::Input(InputError::MissingColumn { column, .. }) => {
                assert_eq!(column, "Layer_No");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_value() {
        let table = RawTable::from_rows(
            &SOUNDING_COLUMNS,
            &[&[
                "1", "100", "1", "east", "4000", "1500", "10", "1.05", "100", "0", "1", "1",
                "1.1", "1499",
            ]],
        );
        let err = parse_table(&table).unwrap_err();
        assert!(matches!(err, TtemError::Input(InputError::InvalidValue { .. })));
    }

    #[test]
    fn test_geo_tables() {
        let options = SoundingOptions::new().with_crs("EPSG:32612");
        let formatter =
            SoundingFormatter::new(vec![SoundingSource::Records(station(1, 100))], options).unwrap();

        let layers = formatter.to_geo_table().unwrap();
        assert_eq!(layers.num_rows(), 3);
        assert_eq!(layers.crs(), "EPSG:32612");
        assert_eq!(layers.x_column(), "UTMX");

        let stations = formatter.summary_geo_table().unwrap();
        assert_eq!(stations.num_rows(), 1);
        assert_eq!(stations.y_column(), "UTMY_mean");
    }

    #[test]
    fn test_bad_header_pattern_is_config_error() {
        let options = SoundingOptions::new().with_sounding_header("(");
        let err = SoundingFormatter::new(vec![SoundingSource::Records(station(1, 1))], options)
            .unwrap_err();
        assert!(matches!(err, TtemError::Config(ConfigError::InvalidOption { .. })));
    }
}
