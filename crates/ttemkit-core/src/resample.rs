//! Log-to-linear depth resampling.
//!
//! Inversions and borehole logs describe the subsurface as intervals of
//! varying thickness. Resampling replaces every interval of thickness `t` by
//! `round(t * f)` contiguous bins of thickness `1 / f`, copying all other
//! attributes from the parent interval. Bin `k` (counted from the top of the
//! parent) is computed directly from `k`:
//!
//! ```text
//! depth_top_k     = parent.depth_top + k / f
//! elevation_top_k = parent.elevation_top - k / f
//! thickness_k     = 1 / f
//! ```
//!
//! The engine does not sort. Groups are emitted in first-appearance order and
//! bins follow the order of their parents within a group, so callers sort each
//! group by depth first (see [`sort_groups_by_depth`]).

use std::hash::Hash;

use crate::error::{ConfigError, Result};
use crate::types::{SoundingRecord, WellRecord};
use crate::utils::group_indices;

/// Number of bins per unit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleFactor(u32);

impl ResampleFactor {
    /// Creates a factor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFactor`] when `factor` is zero, negative
    /// or larger than `u32::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttemkit_core::resample::ResampleFactor;
    ///
    /// let factor = ResampleFactor::new(10).unwrap();
    /// assert_eq!(factor.bin_count(0.25), 3);
    /// assert!(ResampleFactor::new(0).is_err());
    /// ```
    pub fn new(factor: i64) -> Result<Self> {
        u32::try_from(factor)
            .ok()
            .filter(|f| *f > 0)
            .map(Self)
            .ok_or_else(|| ConfigError::InvalidFactor { value: factor }.into())
    }

    /// The factor as an integer.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Thickness of one bin, `1 / f`.
    #[must_use]
    pub fn bin_thickness(self) -> f64 {
        1.0 / f64::from(self.0)
    }

    /// Number of bins an interval of thickness `thickness` becomes:
    /// `round(thickness * f)`, half away from zero.
    ///
    /// Negative and NaN thicknesses give zero bins.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bin_count(self, thickness: f64) -> usize {
        let bins = (thickness * f64::from(self.0)).round();
        if bins.is_nan() || bins <= 0.0 {
            0
        } else {
            bins as usize
        }
    }
}

/// A record spanning a depth interval that can be split into bins.
pub trait DepthInterval: Clone {
    /// Depth to the top of the interval.
    fn depth_top(&self) -> f64;

    /// Thickness of the interval.
    fn thickness(&self) -> f64;

    /// Elevation of the top of the interval.
    fn elevation_top(&self) -> f64;

    /// Copy of `self` describing the sub-interval starting at `depth_top` and
    /// `elevation_top` with the given thickness. Depth and elevation of the
    /// bottom are derived from the thickness.
    #[must_use]
    fn with_interval(&self, depth_top: f64, elevation_top: f64, thickness: f64) -> Self;
}

impl DepthInterval for SoundingRecord {
    fn depth_top(&self) -> f64 {
        self.depth_top
    }

    fn thickness(&self) -> f64 {
        self.thickness
    }

    fn elevation_top(&self) -> f64 {
        self.elevation_cell
    }

    fn with_interval(&self, depth_top: f64, elevation_top: f64, thickness: f64) -> Self {
        Self {
            depth_top,
            depth_bottom: depth_top + thickness,
            elevation_cell: elevation_top,
            elevation_end: elevation_top - thickness,
            thickness,
            ..self.clone()
        }
    }
}

impl DepthInterval for WellRecord {
    fn depth_top(&self) -> f64 {
        self.depth_top
    }

    fn thickness(&self) -> f64 {
        self.thickness
    }

    fn elevation_top(&self) -> f64 {
        self.elevation_top
    }

    fn with_interval(&self, depth_top: f64, elevation_top: f64, thickness: f64) -> Self {
        Self {
            depth_top,
            depth_bottom: depth_top + thickness,
            elevation_top,
            elevation_bottom: elevation_top - thickness,
            thickness,
            ..self.clone()
        }
    }
}

/// Splits one interval into `round(t * f)` bins.
#[allow(clippy::cast_precision_loss)]
pub fn resample_interval<T: DepthInterval>(record: &T, factor: ResampleFactor) -> Vec<T> {
    let f = f64::from(factor.get());
    let bin = factor.bin_thickness();
    (0..factor.bin_count(record.thickness()))
        .map(|k| {
            let offset = k as f64 / f;
            record.with_interval(
                record.depth_top() + offset,
                record.elevation_top() - offset,
                bin,
            )
        })
        .collect()
}

/// Resamples every record, processing groups independently.
///
/// Groups appear in the output in the order their first record appears in
/// `records`; bins keep the order of their parents inside a group.
pub fn resample_groups<T, K, F>(records: &[T], key: F, factor: ResampleFactor) -> Vec<T>
where
    T: DepthInterval,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut output = Vec::new();
    for (_, indices) in group_indices(records, key) {
        for index in indices {
            output.extend(resample_interval(&records[index], factor));
        }
    }
    output
}

/// Reorders `records` so each group is contiguous and sorted by depth top
/// ascending. Groups keep first-appearance order; ties keep input order.
pub fn sort_groups_by_depth<T, K, F>(records: &[T], key: F) -> Vec<T>
where
    T: DepthInterval,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut output = Vec::with_capacity(records.len());
    for (_, indices) in group_indices(records, key) {
        let mut group: Vec<T> = indices.into_iter().map(|i| records[i].clone()).collect();
        group.sort_by(|a, b| a.depth_top().total_cmp(&b.depth_top()));
        output.extend(group);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrainClass;
    use geo_types::Point;

    const EPS: f64 = 1e-9;

    fn well(bore: &str, top: f64, bottom: f64) -> WellRecord {
        WellRecord {
            bore: bore.to_string(),
            depth_top: top,
            depth_bottom: bottom,
            thickness: bottom - top,
            keyword: "fine grain".to_string(),
            grain: GrainClass::Fine,
            x: -97.0,
            y: 41.0,
            z: 100.0,
            elevation_top: 100.0 - top,
            elevation_bottom: 100.0 - bottom,
            geometry: Point::new(-97.0, 41.0),
        }
    }

    #[test]
    fn test_factor_rejects_non_positive() {
        assert!(ResampleFactor::new(0).is_err());
        assert!(ResampleFactor::new(-3).is_err());
        assert!(ResampleFactor::new(i64::from(u32::MAX) + 1).is_err());
        assert_eq!(ResampleFactor::new(5).unwrap().get(), 5);
    }

    #[test]
    fn test_bin_count_rounding() {
        let f = ResampleFactor::new(10).unwrap();
        assert_eq!(f.bin_count(0.25), 3);
        assert_eq!(f.bin_count(0.04), 0);
        assert_eq!(f.bin_count(0.05), 1);
        assert_eq!(f.bin_count(2.0), 20);
        assert_eq!(f.bin_count(-1.0), 0);
        assert_eq!(f.bin_count(f64::NAN), 0);
    }

    #[test]
    fn test_bins_are_contiguous_and_uniform() {
        let f = ResampleFactor::new(4).unwrap();
        let parent = well("A", 1.0, 3.6);
        let bins = resample_interval(&parent, f);

        // round(2.6 * 4) = 10
        assert_eq!(bins.len(), 10);
        for (k, bin) in bins.iter().enumerate() {
            assert!((bin.thickness - 0.25).abs() < EPS);
            assert!((bin.depth_top - (1.0 + k as f64 * 0.25)).abs() < EPS);
            assert!((bin.depth_bottom - bin.depth_top - 0.25).abs() < EPS);
            assert!((bin.elevation_top - (99.0 - k as f64 * 0.25)).abs() < EPS);
            assert!((bin.elevation_bottom - (bin.elevation_top - 0.25)).abs() < EPS);
            assert_eq!(bin.bore, "A");
            assert_eq!(bin.keyword, "fine grain");
        }
        for pair in bins.windows(2) {
            assert!((pair[1].depth_top - pair[0].depth_bottom).abs() < EPS);
        }
        assert!((bins[9].depth_bottom - 3.5).abs() < EPS);
    }

    #[test]
    fn test_thin_interval_vanishes() {
        let f = ResampleFactor::new(10).unwrap();
        assert!(resample_interval(&well("A", 0.0, 0.04), f).is_empty());
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let f = ResampleFactor::new(1).unwrap();
        let records = vec![well("B", 0.0, 1.0), well("A", 0.0, 2.0), well("B", 1.0, 2.0)];
        let out = resample_groups(&records, |r| r.bore.clone(), f);

        let bores: Vec<&str> = out.iter().map(|r| r.bore.as_str()).collect();
        assert_eq!(bores, vec!["B", "B", "A", "A"]);
        assert!((out[1].depth_top - 1.0).abs() < EPS);
    }

    #[test]
    fn test_resampling_twice_is_stable() {
        let f = ResampleFactor::new(10).unwrap();
        let key = |r: &WellRecord| r.bore.clone();
        let intervals = |records: &[WellRecord]| -> Vec<(f64, f64)> {
            records.iter().map(|r| (r.depth_top, r.thickness)).collect()
        };

        let records = vec![well("A", 0.0, 0.5), well("A", 0.5, 2.0), well("B", 0.0, 1.0)];
        let once = resample_groups(&records, key, f);
        let twice = resample_groups(&once, key, f);
        assert_eq!(once.len(), 30);
        assert_eq!(twice.len(), once.len());
        for (a, b) in intervals(&once).iter().zip(intervals(&twice).iter()) {
            assert!((a.0 - b.0).abs() < EPS);
            assert!((a.1 - b.1).abs() < EPS);
        }

        // 0.25 is not a multiple of 0.1: the first pass rounds to 0.3 m.
        let once = resample_groups(&[well("C", 0.0, 0.25)], key, f);
        assert_eq!(once.len(), 3);
        assert!((once[2].depth_bottom - 0.3).abs() < EPS);
        let twice = resample_groups(&once, key, f);
        assert_eq!(twice.len(), 3);
        assert!((twice[2].depth_bottom - 0.3).abs() < EPS);
    }

    #[test]
    fn test_sort_groups_by_depth() {
        let records = vec![well("A", 2.0, 3.0), well("B", 5.0, 6.0), well("A", 0.0, 2.0)];
        let sorted = sort_groups_by_depth(&records, |r| r.bore.clone());
        let tops: Vec<(String, f64)> = sorted.iter().map(|r| (r.bore.clone(), r.depth_top)).collect();
        assert_eq!(
            tops,
            vec![
                ("A".to_string(), 0.0),
                ("A".to_string(), 2.0),
                ("B".to_string(), 5.0)
            ]
        );
    }

    #[test]
    fn test_sounding_bins_update_elevation_end() {
        let record = SoundingRecord {
            id: 1,
            line_no: 100,
            layer_no: 1,
            utmx: 1.0,
            utmy: 1.0,
            elevation_cell: 120.0,
            resistivity: 10.0,
            resistivity_std: Some(1.0),
            conductivity: 100.0,
            depth_top: 0.0,
            depth_bottom: 1.0,
            thickness: 1.0,
            thickness_std: Some(1.0),
            elevation_end: 119.0,
        };
        let bins = resample_interval(&record, ResampleFactor::new(2).unwrap());
        assert_eq!(bins.len(), 2);
        assert!((bins[1].elevation_cell - 119.5).abs() < EPS);
        assert!((bins[1].elevation_end - 119.0).abs() < EPS);
        assert!((bins[1].depth_bottom - 1.0).abs() < EPS);
    }
}
