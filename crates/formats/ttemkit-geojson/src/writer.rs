//! `FeatureCollection` writer.

use std::io::Write as IoWrite;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use ttemkit_core_common::{FormatWriteError, GeoTable, TableWriter};

use crate::properties::{cell_value, check_supported};

/// Options for `GeoJSON` writing
#[derive(Debug, Clone)]
pub struct GeoJsonWriterOptions {
    /// Indent the output (default: false)
    pub pretty: bool,
    /// Keep the x/y columns as properties in addition to the geometry (default: true)
    pub include_coordinate_columns: bool,
    /// Emit a named `crs` member when the table is not in `EPSG:4326` (default: true)
    pub write_crs: bool,
}

impl Default for GeoJsonWriterOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            include_coordinate_columns: true,
            write_crs: true,
        }
    }
}

impl GeoJsonWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pretty printing
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether coordinate columns are kept as properties
    #[must_use]
    pub fn with_coordinate_columns(mut self, include: bool) -> Self {
        self.include_coordinate_columns = include;
        self
    }

    /// Set whether a `crs` member is written for projected tables
    #[must_use]
    pub fn with_crs(mut self, write_crs: bool) -> Self {
        self.write_crs = write_crs;
        self
    }
}

/// Legacy named-CRS member, e.g. `urn:ogc:def:crs:EPSG::32614`.
fn crs_member(crs: &str) -> Option<JsonObject> {
    let code = crs
        .strip_prefix("EPSG:")
        .or_else(|| crs.strip_prefix("epsg:"))?;
    if code == "4326" {
        return None;
    }
    let mut properties = JsonObject::new();
    properties.insert(
        "name".to_string(),
        JsonValue::from(format!("urn:ogc:def:crs:EPSG::{code}")),
    );
    let mut crs_object = JsonObject::new();
    crs_object.insert("type".to_string(), JsonValue::from("name"));
    crs_object.insert("properties".to_string(), JsonValue::Object(properties));

    let mut members = JsonObject::new();
    members.insert("crs".to_string(), JsonValue::Object(crs_object));
    Some(members)
}

/// Convert a point table into a `FeatureCollection`.
///
/// Rows with a null coordinate produce a feature without geometry.
///
/// # Errors
///
/// Returns [`FormatWriteError::UnsupportedColumn`] if a column type has no
/// JSON representation.
pub fn to_feature_collection(
    table: &GeoTable,
    options: &GeoJsonWriterOptions,
) -> Result<FeatureCollection, FormatWriteError> {
    let batch = table.batch();
    let schema = batch.schema();

    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let is_coordinate = field.name() == table.x_column() || field.name() == table.y_column();
        if is_coordinate && !options.include_coordinate_columns {
            continue;
        }
        check_supported(field)?;
        columns.push((field.name().clone(), array));
    }

    let features = (0..table.num_rows())
        .map(|row| {
            let properties: JsonObject = columns
                .iter()
                .map(|(name, array)| (name.clone(), cell_value(array.as_ref(), row)))
                .collect();
            Feature {
                geometry: table
                    .xy(row)
                    .map(|(x, y)| Geometry::new(Value::Point(vec![x, y]))),
                properties: Some(properties),
                ..Feature::default()
            }
        })
        .collect();

    let foreign_members = if options.write_crs {
        crs_member(table.crs())
    } else {
        None
    };

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    })
}

/// Write a point table as a `GeoJSON` `FeatureCollection`
///
/// # Errors
///
/// Returns an error if a column cannot be encoded or writing fails
pub fn write_geojson<W: IoWrite>(
    writer: &mut W,
    table: &GeoTable,
    options: &GeoJsonWriterOptions,
) -> Result<(), FormatWriteError> {
    let collection = to_feature_collection(table, options)?;
    let result = if options.pretty {
        serde_json::to_writer_pretty(&mut *writer, &collection)
    } else {
        serde_json::to_writer(&mut *writer, &collection)
    };
    result.map_err(|e| FormatWriteError::Serialize {
        message: e.to_string(),
    })?;
    writer.write_all(b"\n")?;
    log::debug!(
        "Wrote {} features for layer '{}'",
        collection.features.len(),
        table.name()
    );
    Ok(())
}

/// [`TableWriter`] producing `GeoJSON`.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonTableWriter {
    options: GeoJsonWriterOptions,
}

impl GeoJsonTableWriter {
    /// Creates a writer with the given options.
    #[must_use]
    pub fn new(options: GeoJsonWriterOptions) -> Self {
        Self { options }
    }
}

impl TableWriter for GeoJsonTableWriter {
    fn write_table(
        &self,
        mut writer: &mut dyn IoWrite,
        table: &GeoTable,
    ) -> Result<(), FormatWriteError> {
        write_geojson(&mut writer, table, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn table(crs: &str) -> GeoTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new("ID", DataType::Int64, false),
            Field::new("Keyword", DataType::Utf8, true),
            Field::new("UTMX", DataType::Float64, true),
            Field::new("UTMY", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec![Some("sand"), None])),
            Arc::new(Float64Array::from(vec![Some(500.0), None])),
            Arc::new(Float64Array::from(vec![Some(4000.0), Some(4001.0)])),
        ];
        let batch = RecordBatch::try_new(schema, columns).unwrap();
        GeoTable::try_new(batch, "UTMX", "UTMY", crs).unwrap()
    }

    #[test]
    fn test_features_carry_points_and_properties() {
        let collection =
            to_feature_collection(&table("EPSG:4326"), &GeoJsonWriterOptions::default()).unwrap();

        assert_eq!(collection.features.len(), 2);
        let first = &collection.features[0];
        let geometry = first.geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![500.0, 4000.0]));
        let props = first.properties.as_ref().unwrap();
        assert_eq!(props["ID"], JsonValue::from(1));
        assert_eq!(props["Keyword"], JsonValue::from("sand"));

        let second = &collection.features[1];
        assert!(second.geometry.is_none());
        assert_eq!(second.properties.as_ref().unwrap()["Keyword"], JsonValue::Null);
        assert!(collection.foreign_members.is_none());
    }

    #[test]
    fn test_coordinate_columns_can_be_dropped() {
        let options = GeoJsonWriterOptions::default().with_coordinate_columns(false);
        let collection = to_feature_collection(&table("EPSG:4326"), &options).unwrap();
        let props = collection.features[0].properties.as_ref().unwrap();
        assert!(!props.contains_key("UTMX"));
        assert!(props.contains_key("ID"));
    }

    #[test]
    fn test_projected_table_gets_crs_member() {
        let collection =
            to_feature_collection(&table("EPSG:32614"), &GeoJsonWriterOptions::default()).unwrap();
        let members = collection.foreign_members.unwrap();
        assert_eq!(
            members["crs"]["properties"]["name"],
            JsonValue::from("urn:ogc:def:crs:EPSG::32614")
        );
    }

    #[test]
    fn test_write_geojson_output_parses() {
        let mut buffer = Vec::new();
        write_geojson(&mut buffer, &table("EPSG:4326"), &GeoJsonWriterOptions::default())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let parsed: geojson::GeoJson = text.trim().parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("unexpected GeoJSON: {other:?}"),
        }
    }
}
