//! Record types shared by the sounding and well pipelines.
//!
//! All records are plain value rows. Pipeline stages take a `Vec` of records
//! and return a new `Vec`; nothing is mutated in place across stages.

use std::fmt;

use geo_types::Point;
use serde::{Deserialize, Serialize};

/// Standard-deviation value Aarhus Workbench writes for an unresolved layer.
pub const STD_SENTINEL: f64 = 9999.0;

/// Converts a raw standard deviation into `None` when it carries the sentinel.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn std_or_sentinel(value: f64) -> Option<f64> {
    (value != STD_SENTINEL).then_some(value)
}

/// One inverted layer of a tTEM sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundingRecord {
    /// Station id
    pub id: i64,
    /// Survey line number
    pub line_no: i64,
    /// Layer number, 1 at the surface
    pub layer_no: i64,
    /// Easting
    pub utmx: f64,
    /// Northing
    pub utmy: f64,
    /// Elevation of the top of the cell
    pub elevation_cell: f64,
    /// Resistivity (ohm-m)
    pub resistivity: f64,
    /// Resistivity standard deviation, `None` for the 9999 sentinel
    pub resistivity_std: Option<f64>,
    /// Conductivity
    pub conductivity: f64,
    /// Depth to the top of the layer
    pub depth_top: f64,
    /// Depth to the bottom of the layer
    pub depth_bottom: f64,
    /// Layer thickness
    pub thickness: f64,
    /// Thickness standard deviation, `None` for the 9999 sentinel
    pub thickness_std: Option<f64>,
    /// Elevation of the bottom of the cell (`elevation_cell - thickness`)
    pub elevation_end: f64,
}

impl SoundingRecord {
    /// A record is usable only when both standard deviations were resolved.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.resistivity_std.is_some() && self.thickness_std.is_some()
    }

    /// Recomputes `elevation_end` from the cell elevation and thickness.
    pub fn recompute_elevation_end(&mut self) {
        self.elevation_end = self.elevation_cell - self.thickness;
    }

    /// Grouping key of the sounding location.
    #[must_use]
    pub fn xy_key(&self) -> XyKey {
        XyKey::new(self.utmx, self.utmy)
    }
}

/// Depth-of-investigation elevation at one sounding location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoiRecord {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
    /// DOI elevation; layers whose cell elevation is below it are removed
    pub value: f64,
}

/// One lithology interval of a borehole log.
#[derive(Debug, Clone, PartialEq)]
pub struct LithologyInterval {
    /// Borehole id
    pub bore: String,
    /// Depth to the top of the interval
    pub depth_top: f64,
    /// Depth to the bottom of the interval
    pub depth_bottom: f64,
    /// `depth_bottom - depth_top`
    pub thickness: f64,
    /// Lithology description
    pub keyword: String,
}

impl LithologyInterval {
    /// Creates an interval, deriving its thickness.
    #[must_use]
    pub fn new(
        bore: impl Into<String>,
        depth_top: f64,
        depth_bottom: f64,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            bore: bore.into(),
            depth_top,
            depth_bottom,
            thickness: depth_bottom - depth_top,
            keyword: keyword.into(),
        }
    }
}

/// Ordinal grain-size class derived from a lithology keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GrainClass {
    /// Keyword did not match a known class
    #[default]
    Unclassified,
    /// Fine grain
    Fine,
    /// Mixed grain
    Mixed,
    /// Coarse grain
    Coarse,
}

impl GrainClass {
    /// Numeric code written to the `Keyword_n` column.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Unclassified => 0,
            Self::Fine => 1,
            Self::Mixed => 2,
            Self::Coarse => 3,
        }
    }
}

/// Surface location of a borehole.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    /// Borehole id
    pub bore: String,
    /// Latitude (or northing)
    pub latitude: f64,
    /// Longitude (or easting)
    pub longitude: f64,
    /// Land-surface elevation
    pub elevation: f64,
}

/// Lithology interval joined with its borehole location.
#[derive(Debug, Clone, PartialEq)]
pub struct WellRecord {
    /// Borehole id
    pub bore: String,
    /// Depth to the top of the interval
    pub depth_top: f64,
    /// Depth to the bottom of the interval
    pub depth_bottom: f64,
    /// Interval thickness
    pub thickness: f64,
    /// Lithology description
    pub keyword: String,
    /// Classified keyword
    pub grain: GrainClass,
    /// Cached x of `geometry`
    pub x: f64,
    /// Cached y of `geometry`
    pub y: f64,
    /// Land-surface elevation
    pub z: f64,
    /// `z - depth_top`
    pub elevation_top: f64,
    /// `z - depth_bottom`
    pub elevation_bottom: f64,
    /// Point location in the formatter's CRS
    pub geometry: Point<f64>,
}

/// What to do when a DOI or location lookup finds no partner record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Drop the group and record it in the [`DropReport`]
    #[default]
    Lenient,
    /// Fail with [`JoinError::UnmatchedJoinKey`](crate::error::JoinError::UnmatchedJoinKey)
    Strict,
}

/// A group removed because its join key had no match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedGroup {
    /// Printable join key, e.g. `(500, 4000)` or a bore id
    pub key: String,
    /// Number of rows removed with the group
    pub rows: usize,
}

/// Groups dropped during a lenient join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropReport {
    groups: Vec<DroppedGroup>,
}

impl DropReport {
    /// Records a dropped group.
    pub fn record(&mut self, key: impl Into<String>, rows: usize) {
        self.groups.push(DroppedGroup {
            key: key.into(),
            rows,
        });
    }

    /// Appends the groups of another report.
    pub fn extend(&mut self, other: DropReport) {
        self.groups.extend(other.groups);
    }

    /// Returns `true` when nothing was dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Dropped groups in the order they were encountered.
    #[must_use]
    pub fn groups(&self) -> &[DroppedGroup] {
        &self.groups
    }

    /// Total number of rows dropped.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(|g| g.rows).sum()
    }
}

impl fmt::Display for DropReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} group(s), {} row(s) dropped",
            self.groups.len(),
            self.total_rows()
        )
    }
}

/// Exact (x, y) grouping key.
///
/// Coordinates are compared bit for bit, with `-0.0` folded into `0.0`, which
/// matches the exact equality used for DOI lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XyKey {
    x: u64,
    y: u64,
}

impl XyKey {
    /// Creates a key from a coordinate pair.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: (x + 0.0).to_bits(),
            y: (y + 0.0).to_bits(),
        }
    }

    /// The x coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        f64::from_bits(self.x)
    }

    /// The y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        f64::from_bits(self.y)
    }
}

impl fmt::Display for XyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}
