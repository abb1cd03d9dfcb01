//! Arrow batches for formatter output.
//!
//! Column names follow the tTEM toolbox conventions so exported tables keep
//! the headers users already know (`UTMX`, `Elevation_Cell`, `Keyword_n`, ...).

use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};

use crate::error::Result;
use crate::sounding::StationSummary;
use crate::types::{SoundingRecord, WellRecord};

/// Column names of the per-layer sounding table.
pub const SOUNDING_COLUMNS: [&str; 14] = [
    "ID",
    "Line_No",
    "Layer_No",
    "UTMX",
    "UTMY",
    "Elevation_Cell",
    "Resistivity",
    "Resistivity_STD",
    "Conductivity",
    "Depth_top",
    "Depth_bottom",
    "Thickness",
    "Thickness_STD",
    "Elevation_End",
];

/// Column names of the per-station summary table.
pub const SUMMARY_COLUMNS: [&str; 9] = [
    "ID",
    "Depth_bottom_max",
    "Elevation_Cell_max",
    "Elevation_End_min",
    "Resistivity_min",
    "Resistivity_max",
    "Resistivity_mean",
    "UTMX_mean",
    "UTMY_mean",
];

/// Column names of the joined well table.
pub const WELL_COLUMNS: [&str; 11] = [
    "Bore",
    "Depth_top",
    "Depth_bottom",
    "Thickness",
    "Keyword",
    "Keyword_n",
    "X",
    "Y",
    "Z",
    "Elevation_top",
    "Elevation_bottom",
];

/// Column-by-column [`RecordBatch`] assembly.
#[derive(Debug, Default)]
pub(crate) struct BatchBuilder {
    fields: Vec<Field>,
    columns: Vec<ArrayRef>,
}

impl BatchBuilder {
    fn push(mut self, field: Field, column: ArrayRef) -> Self {
        self.fields.push(field);
        self.columns.push(column);
        self
    }

    pub(crate) fn int64(self, name: &str, values: Vec<i64>) -> Self {
        self.push(
            Field::new(name, DataType::Int64, false),
            Arc::new(Int64Array::from(values)),
        )
    }

    pub(crate) fn float64(self, name: &str, values: Vec<f64>) -> Self {
        self.push(
            Field::new(name, DataType::Float64, false),
            Arc::new(Float64Array::from(values)),
        )
    }

    pub(crate) fn nullable_float64(self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.push(
            Field::new(name, DataType::Float64, true),
            Arc::new(Float64Array::from(values)),
        )
    }

    pub(crate) fn utf8(self, name: &str, values: Vec<String>) -> Self {
        self.push(
            Field::new(name, DataType::Utf8, false),
            Arc::new(StringArray::from(values)),
        )
    }

    pub(crate) fn finish(self) -> Result<RecordBatch> {
        let schema = Arc::new(Schema::new(self.fields));
        Ok(RecordBatch::try_new(schema, self.columns)?)
    }
}

fn column<T, U>(items: &[T], f: impl Fn(&T) -> U) -> Vec<U> {
    items.iter().map(f).collect()
}

/// Builds the per-layer sounding batch.
///
/// # Errors
///
/// Returns an Arrow error if the batch cannot be assembled.
pub fn sounding_batch(records: &[SoundingRecord]) -> Result<RecordBatch> {
    let [id, line, layer, x, y, elev, res, res_std, cond, top, bottom, thick, thick_std, end] =
        SOUNDING_COLUMNS;
    BatchBuilder::default()
        .int64(id, column(records, |r| r.id))
        .int64(line, column(records, |r| r.line_no))
        .int64(layer, column(records, |r| r.layer_no))
        .float64(x, column(records, |r| r.utmx))
        .float64(y, column(records, |r| r.utmy))
        .float64(elev, column(records, |r| r.elevation_cell))
        .float64(res, column(records, |r| r.resistivity))
        .nullable_float64(res_std, column(records, |r| r.resistivity_std))
        .float64(cond, column(records, |r| r.conductivity))
        .float64(top, column(records, |r| r.depth_top))
        .float64(bottom, column(records, |r| r.depth_bottom))
        .float64(thick, column(records, |r| r.thickness))
        .nullable_float64(thick_std, column(records, |r| r.thickness_std))
        .float64(end, column(records, |r| r.elevation_end))
        .finish()
}

/// Builds the per-station summary batch.
///
/// # Errors
///
/// Returns an Arrow error if the batch cannot be assembled.
pub fn summary_batch(stations: &[StationSummary]) -> Result<RecordBatch> {
    let [id, depth, elev_max, end_min, res_min, res_max, res_mean, x, y] = SUMMARY_COLUMNS;
    BatchBuilder::default()
        .int64(id, column(stations, |s| s.id))
        .float64(depth, column(stations, |s| s.depth_bottom_max))
        .float64(elev_max, column(stations, |s| s.elevation_cell_max))
        .float64(end_min, column(stations, |s| s.elevation_end_min))
        .float64(res_min, column(stations, |s| s.resistivity_min))
        .float64(res_max, column(stations, |s| s.resistivity_max))
        .float64(res_mean, column(stations, |s| s.resistivity_mean))
        .float64(x, column(stations, |s| s.utmx_mean))
        .float64(y, column(stations, |s| s.utmy_mean))
        .finish()
}

/// Builds the joined well batch.
///
/// # Errors
///
/// Returns an Arrow error if the batch cannot be assembled.
pub fn well_batch(records: &[WellRecord]) -> Result<RecordBatch> {
    let [bore, top, bottom, thick, keyword, code, x, y, z, elev_top, elev_bottom] = WELL_COLUMNS;
    BatchBuilder::default()
        .utf8(bore, column(records, |r| r.bore.clone()))
        .float64(top, column(records, |r| r.depth_top))
        .float64(bottom, column(records, |r| r.depth_bottom))
        .float64(thick, column(records, |r| r.thickness))
        .utf8(keyword, column(records, |r| r.keyword.clone()))
        .int64(code, column(records, |r| r.grain.code()))
        .float64(x, column(records, |r| r.x))
        .float64(y, column(records, |r| r.y))
        .float64(z, column(records, |r| r.z))
        .float64(elev_top, column(records, |r| r.elevation_top))
        .float64(elev_bottom, column(records, |r| r.elevation_bottom))
        .finish()
}
