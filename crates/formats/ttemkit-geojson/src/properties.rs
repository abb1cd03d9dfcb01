//! Conversion of Arrow cells into JSON property values.

use arrow_array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, UInt32Array, UInt64Array,
};
use arrow_schema::{DataType, Field};
use geojson::JsonValue;
use serde_json::Number;
use ttemkit_core_common::FormatWriteError;

/// Returns an error if the writer cannot encode columns of `field`'s type.
pub(crate) fn check_supported(field: &Field) -> Result<(), FormatWriteError> {
    match field.data_type() {
        DataType::Null
        | DataType::Boolean
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64
        | DataType::Utf8
        | DataType::LargeUtf8 => Ok(()),
        other => Err(FormatWriteError::UnsupportedColumn {
            column: field.name().clone(),
            data_type: other.to_string(),
        }),
    }
}

fn float(value: f64) -> JsonValue {
    Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

macro_rules! cell {
    ($array:expr, $ty:ty, $row:expr, $convert:expr) => {
        $array
            .as_any()
            .downcast_ref::<$ty>()
            .map(|a| $convert(a.value($row)))
            .unwrap_or(JsonValue::Null)
    };
}

/// JSON value of `array[row]`.
///
/// Nulls and non-finite floats become `null`. Callers check the column type
/// with [`check_supported`] first; unsupported types also map to `null`.
pub(crate) fn cell_value(array: &dyn Array, row: usize) -> JsonValue {
    if array.is_null(row) {
        return JsonValue::Null;
    }
    match array.data_type() {
        DataType::Boolean => cell!(array, BooleanArray, row, JsonValue::Bool),
        DataType::Int32 => cell!(array, Int32Array, row, |v: i32| JsonValue::from(v)),
        DataType::Int64 => cell!(array, Int64Array, row, |v: i64| JsonValue::from(v)),
        DataType::UInt32 => cell!(array, UInt32Array, row, |v: u32| JsonValue::from(v)),
        DataType::UInt64 => cell!(array, UInt64Array, row, |v: u64| JsonValue::from(v)),
        DataType::Float32 => cell!(array, Float32Array, row, |v: f32| float(f64::from(v))),
        DataType::Float64 => cell!(array, Float64Array, row, float),
        DataType::Utf8 => cell!(array, StringArray, row, |v: &str| JsonValue::from(v)),
        DataType::LargeUtf8 => cell!(array, LargeStringArray, row, |v: &str| JsonValue::from(v)),
        _ => JsonValue::Null,
    }
}
