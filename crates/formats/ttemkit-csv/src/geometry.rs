//! WKT encoding of point coordinates.

use std::sync::Arc;

use arrow_array::{ArrayRef, builder::StringBuilder};
use geo_types::{Geometry, Point};
use geozero::ToWkt;
use ttemkit_core_common::{FormatWriteError, GeoTable};

/// Encode one coordinate pair as WKT, e.g. `POINT(1 2)`.
///
/// # Errors
///
/// Returns [`FormatWriteError::Geometry`] if the encoder rejects the point.
pub fn point_wkt(row: usize, x: f64, y: f64) -> Result<String, FormatWriteError> {
    Geometry::Point(Point::new(x, y))
        .to_wkt()
        .map_err(|e| FormatWriteError::Geometry {
            row,
            message: e.to_string(),
        })
}

/// Build a WKT string column for every row of `table`.
///
/// Rows with a null coordinate get a null geometry.
///
/// # Errors
///
/// Returns an error if any point fails to encode.
pub fn build_wkt_column(table: &GeoTable) -> Result<ArrayRef, FormatWriteError> {
    let rows = table.num_rows();
    let mut builder = StringBuilder::with_capacity(rows, rows * 32);

    for row in 0..rows {
        match table.xy(row) {
            Some((x, y)) => builder.append_value(point_wkt(row, x, y)?),
            None => builder.append_null(),
        }
    }

    Ok(Arc::new(builder.finish()))
}
