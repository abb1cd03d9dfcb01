//! Lithology and location extraction, and the bore-id join between them.

use geo_types::Point;
use ttemkit_core_common::RawTable;

use crate::columns::{ColumnResolver, FieldReader, field};
use crate::error::{JoinError, Result};
use crate::types::{DropReport, GrainClass, LithologyInterval, LocationRecord, MatchPolicy, WellRecord};
use crate::utils::group_indices;

/// Reads the lithology intervals of `table`.
///
/// # Errors
///
/// Returns [`InputError::MissingColumn`](crate::error::InputError::MissingColumn)
/// when a lithology column cannot be resolved, and
/// [`InputError::InvalidValue`](crate::error::InputError::InvalidValue) for
/// empty bore ids, non-numeric depths and intervals whose bottom lies above
/// their top.
pub fn extract_lithology(
    table: &RawTable,
    columns: &ColumnResolver,
) -> Result<Vec<LithologyInterval>> {
    let bore = columns.require(field::BORE, table)?;
    let top = columns.require(field::DEPTH_TOP, table)?;
    let bottom = columns.require(field::DEPTH_BOTTOM, table)?;
    let keyword = columns.require(field::KEYWORD, table)?;

    (0..table.len())
        .map(|row| {
            let f = FieldReader::new(table, row);
            let depth_top = f.f64(top)?;
            let depth_bottom = f.f64(bottom)?;
            if depth_bottom < depth_top {
                return Err(f.reject(bottom, "depth bottom is above depth top"));
            }
            Ok(LithologyInterval::new(
                f.non_empty(bore)?,
                depth_top,
                depth_bottom,
                f.text(keyword),
            ))
        })
        .collect()
}

/// Reads the borehole locations of `table`.
///
/// # Errors
///
/// Same as [`extract_lithology`] for the location columns.
pub fn extract_locations(
    table: &RawTable,
    columns: &ColumnResolver,
) -> Result<Vec<LocationRecord>> {
    let bore = columns.require(field::BORE, table)?;
    let latitude = columns.require(field::LATITUDE, table)?;
    let longitude = columns.require(field::LONGITUDE, table)?;
    let elevation = columns.require(field::ELEVATION, table)?;

    (0..table.len())
        .map(|row| {
            let f = FieldReader::new(table, row);
            Ok(LocationRecord {
                bore: f.non_empty(bore)?.to_string(),
                latitude: f.f64(latitude)?,
                longitude: f.f64(longitude)?,
                elevation: f.f64(elevation)?,
            })
        })
        .collect()
}

/// Attaches a location to every lithology interval.
///
/// Intervals are grouped by bore in first-appearance order. Each group takes
/// the first location with the same bore id; elevations are measured down
/// from its surface elevation. Keywords are left unclassified.
///
/// # Errors
///
/// Returns [`JoinError::UnmatchedJoinKey`] for the first bore without a
/// location under [`MatchPolicy::Strict`].
pub fn spatial_join(
    lithology: &[LithologyInterval],
    locations: &[LocationRecord],
    policy: MatchPolicy,
) -> Result<(Vec<WellRecord>, DropReport)> {
    let mut joined = Vec::with_capacity(lithology.len());
    let mut report = DropReport::default();

    for (bore, indices) in group_indices(lithology, |i| i.bore.clone()) {
        let Some(location) = locations.iter().find(|l| l.bore == bore) else {
            if policy == MatchPolicy::Strict {
                return Err(JoinError::UnmatchedJoinKey {
                    kind: "location".to_string(),
                    key: bore,
                }
                .into());
            }
            report.record(bore, indices.len());
            continue;
        };

        joined.extend(indices.into_iter().map(|i| {
            let interval = &lithology[i];
            WellRecord {
                bore: interval.bore.clone(),
                depth_top: interval.depth_top,
                depth_bottom: interval.depth_bottom,
                thickness: interval.thickness,
                keyword: interval.keyword.clone(),
                grain: GrainClass::Unclassified,
                x: location.longitude,
                y: location.latitude,
                z: location.elevation,
                elevation_top: location.elevation - interval.depth_top,
                elevation_bottom: location.elevation - interval.depth_bottom,
                geometry: Point::new(location.longitude, location.latitude),
            }
        }));
    }

    if !report.is_empty() {
        log::warn!("Well join: no location for {report}");
    }
    Ok((joined, report))
}
