//! Depth-of-investigation clipping.
//!
//! A DOI export lists, per sounding location, the elevation below which the
//! inversion is no longer supported by data. Layers whose cell top lies below
//! that elevation are removed.

use std::path::PathBuf;

use ttemkit_core_common::RawTable;
use ttemkit_xyz::XyzReader;

use crate::columns::{FieldReader, require_exact};
use crate::error::{JoinError, Result};
use crate::types::{DoiRecord, DropReport, MatchPolicy, SoundingRecord};
use crate::utils::{group_indices, read_input};

/// Where DOI values come from.
#[derive(Debug, Clone)]
pub enum DoiSource {
    /// An Aarhus Workbench DOI export
    File(PathBuf),
    /// An already parsed table with `UTMX`, `UTMY` and `Value` columns
    Table(RawTable),
    /// Ready-made records
    Records(Vec<DoiRecord>),
}

/// DOI values in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoiTable {
    records: Vec<DoiRecord>,
}

impl DoiTable {
    /// Wraps `records`, keeping their order.
    #[must_use]
    pub fn new(records: Vec<DoiRecord>) -> Self {
        Self { records }
    }

    /// Extracts the `UTMX`, `UTMY` and `Value` columns of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingColumn`](crate::error::InputError::MissingColumn)
    /// or [`InputError::InvalidValue`](crate::error::InputError::InvalidValue).
    pub fn from_table(table: &RawTable) -> Result<Self> {
        let x = require_exact(table, "UTMX")?;
        let y = require_exact(table, "UTMY")?;
        let value = require_exact(table, "Value")?;

        let records = (0..table.len())
            .map(|row| {
                let fields = FieldReader::new(table, row);
                Ok(DoiRecord {
                    x: fields.f64(x)?,
                    y: fields.f64(y)?,
                    value: fields.f64(value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }

    /// Loads and concatenates all sources in order.
    ///
    /// # Errors
    ///
    /// Returns read errors for files and extraction errors for tables.
    pub fn from_sources(sources: &[DoiSource], reader: &XyzReader) -> Result<Self> {
        let mut records = Vec::new();
        for source in sources {
            match source {
                DoiSource::File(path) => {
                    let table = read_input(reader, path)?;
                    log::debug!("Read {} DOI rows from {}", table.len(), path.display());
                    records.extend(Self::from_table(&table)?.records);
                },
                DoiSource::Table(table) => records.extend(Self::from_table(table)?.records),
                DoiSource::Records(list) => records.extend_from_slice(list),
            }
        }
        Ok(Self::new(records))
    }

    /// The first record located exactly at `(x, y)`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn lookup(&self, x: f64, y: f64) -> Option<&DoiRecord> {
        self.records.iter().find(|r| r.x == x && r.y == y)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in load order.
    #[must_use]
    pub fn records(&self) -> &[DoiRecord] {
        &self.records
    }
}

/// Keeps the layers at or above the DOI elevation of their location.
///
/// Records are grouped by exact `(utmx, utmy)`. Each group is looked up once;
/// rows with `elevation_cell >= doi` survive in input order. A group without a
/// DOI record is dropped and reported under [`MatchPolicy::Lenient`].
///
/// # Errors
///
/// Returns [`JoinError::UnmatchedJoinKey`] for the first unmatched group under
/// [`MatchPolicy::Strict`].
pub fn apply_doi(
    records: &[SoundingRecord],
    doi: &DoiTable,
    policy: MatchPolicy,
) -> Result<(Vec<SoundingRecord>, DropReport)> {
    let mut keep = vec![false; records.len()];
    let mut report = DropReport::default();

    for (key, indices) in group_indices(records, SoundingRecord::xy_key) {
        match doi.lookup(key.x(), key.y()) {
            Some(limit) => {
                for index in indices {
                    keep[index] = records[index].elevation_cell >= limit.value;
                }
            },
            None if policy == MatchPolicy::Strict => {
                return Err(JoinError::UnmatchedJoinKey {
                    kind: "DOI".to_string(),
                    key: key.to_string(),
                }
                .into());
            },
            None => report.record(key.to_string(), indices.len()),
        }
    }

    if !report.is_empty() {
        log::warn!("DOI filter: no DOI value for {report}");
    }

    let kept = records
        .iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then(|| record.clone()))
        .collect();
    Ok((kept, report))
}
