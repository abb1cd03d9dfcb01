//! Driver registry for table format support and capabilities.
//!
//! This module provides a static registry of the formats `ttemkit` reads and
//! exports, including their current support status (supported, planned, or not
//! supported) for reading and writing. Export selects a driver by file
//! extension.
//!
//! # Examples
//!
//! ```
//! use ttemkit_core::drivers::{find_driver, find_driver_by_extension, get_available_drivers};
//!
//! // Find a specific driver
//! let geojson = find_driver("GeoJSON").expect("GeoJSON driver should exist");
//! assert!(geojson.capabilities.write.is_supported());
//!
//! // Select by extension
//! let csv = find_driver_by_extension("CSV").expect("CSV driver should exist");
//! assert_eq!(csv.short_name, "CSV");
//!
//! // List all drivers with supported operations
//! for driver in get_available_drivers() {
//!     println!("{}: {}", driver.short_name, driver.long_name);
//! }
//! ```

pub use ttemkit_core_common::{Driver, DriverCapabilities, SupportStatus};

/// Returns the complete registry of all known drivers.
///
/// # Examples
///
/// ```
/// use ttemkit_core::drivers::get_drivers;
///
/// let writable = get_drivers()
///     .iter()
///     .filter(|d| d.capabilities.write.is_supported())
///     .count();
/// assert_eq!(writable, 2);
/// ```
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    use SupportStatus::{NotSupported, Planned, Supported};

    vec![
        Driver::new(
            "CSV",
            "Comma Separated Value (.csv)",
            &["csv"],
            Supported,
            Supported,
        ),
        Driver::new(
            "GeoJSON",
            "GeoJSON",
            &["geojson", "json"],
            NotSupported,
            Supported,
        ),
        Driver::new(
            "XYZ",
            "Aarhus Workbench XYZ export",
            &["xyz"],
            Supported,
            NotSupported,
        ),
        Driver::new(
            "ESRI Shapefile",
            "ESRI Shapefile / DBF",
            &["shp"],
            NotSupported,
            Planned,
        ),
        Driver::new("GPKG", "GeoPackage vector", &["gpkg"], NotSupported, Planned),
        Driver::new("FlatGeobuf", "FlatGeobuf", &["fgb"], NotSupported, Planned),
    ]
}

/// Returns only drivers with at least one fully supported operation.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| d.capabilities.has_supported_operation())
        .collect()
}

/// Finds a driver by its short name (case-insensitive).
///
/// Returns `None` if no driver with the given name exists in the registry.
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.short_name.eq_ignore_ascii_case(name))
}

/// Finds the driver registered for a file extension (case-insensitive, with
/// or without the leading dot).
#[must_use]
pub fn find_driver_by_extension(extension: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.matches_extension(extension))
}

/// Lists all drivers that support specific capabilities.
///
/// If a capability parameter is `false`, that operation is not required; if
/// `true`, the driver must fully support it.
///
/// # Arguments
///
/// * `read` - If `true`, only include drivers that support reading
/// * `write` - If `true`, only include drivers that support writing
#[must_use]
pub fn list_drivers_with_capability(read: bool, write: bool) -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| {
            let read_ok = !read || d.capabilities.read.is_supported();
            let write_ok = !write || d.capabilities.write.is_supported();
            read_ok && write_ok
        })
        .collect()
}

/// Returns all driver short names in alphabetically sorted order.
///
/// # Examples
///
/// ```
/// use ttemkit_core::drivers::get_driver_names;
///
/// let names = get_driver_names();
/// assert!(names.contains(&"GeoJSON"));
///
/// let mut sorted = names.clone();
/// sorted.sort_unstable();
/// assert_eq!(names, sorted);
/// ```
#[must_use]
pub fn get_driver_names() -> Vec<&'static str> {
    let mut names: Vec<_> = get_drivers().iter().map(|d| d.short_name).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_driver_case_insensitive() {
        let driver = find_driver("geojson");
        assert!(driver.is_some());
        assert_eq!(driver.unwrap().short_name, "GeoJSON");
        assert!(find_driver("KML").is_none());
    }

    #[test]
    fn test_find_driver_by_extension() {
        assert_eq!(find_driver_by_extension(".JSON").unwrap().short_name, "GeoJSON");
        assert_eq!(find_driver_by_extension("fgb").unwrap().short_name, "FlatGeobuf");
        assert!(find_driver_by_extension("xlsx").is_none());
        assert!(find_driver_by_extension("").is_none());
    }

    #[test]
    fn test_list_read_write_drivers() {
        let drivers = list_drivers_with_capability(true, true);
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].short_name, "CSV");

        let writers = list_drivers_with_capability(false, true);
        assert_eq!(writers.len(), 2);
    }

    #[test]
    fn test_available_drivers() {
        let names: Vec<&str> = get_available_drivers().iter().map(|d| d.short_name).collect();
        assert_eq!(names, vec!["CSV", "GeoJSON", "XYZ"]);
    }

    #[test]
    fn test_planned_writers_are_not_supported() {
        let shp = find_driver("ESRI Shapefile").unwrap();
        assert!(!shp.capabilities.write.is_supported());
        assert!(shp.capabilities.write.is_available());
    }
}
