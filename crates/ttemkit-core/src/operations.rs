//! Export of point tables.
//!
//! This module writes a [`GeoTable`] to disk, selecting the output format from
//! the driver registry by file extension.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use ttemkit_core_common::{GeoTable, TableWriter};
use ttemkit_csv::{CsvTableWriter, CsvWriterOptions};
use ttemkit_geojson::{GeoJsonTableWriter, GeoJsonWriterOptions};

use crate::drivers::{Driver, find_driver, find_driver_by_extension};
use crate::error::{DriverError, IoErrorExt, Result, driver_not_found};

/// Writes `table` to `path`, choosing the driver from the file extension.
///
/// Returns the driver that was used.
///
/// # Arguments
///
/// * `table` - The point table to write.
/// * `path` - Output file; `.csv`, `.geojson` and `.json` are writable.
///
/// # Errors
///
/// This function will return an error if:
/// - No driver is registered for the extension ([`DriverError::UnsupportedFormat`]).
/// - The driver cannot write yet ([`DriverError::OperationNotSupported`]).
/// - The file cannot be created or written.
pub fn export(table: &GeoTable, path: &Path) -> Result<Driver> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let driver =
        find_driver_by_extension(extension).ok_or_else(|| DriverError::UnsupportedFormat {
            extension: extension.to_string(),
            path: path.to_path_buf(),
        })?;
    export_with_driver(table, path, &driver)?;
    Ok(driver)
}

/// Writes `table` to `path` with the driver named `driver_name`, ignoring the
/// file extension.
///
/// # Errors
///
/// Returns [`DriverError::NotFound`] for an unknown driver name, otherwise the
/// same errors as [`export`].
pub fn export_as(table: &GeoTable, path: &Path, driver_name: &str) -> Result<Driver> {
    let driver = find_driver(driver_name).ok_or_else(|| driver_not_found(driver_name))?;
    export_with_driver(table, path, &driver)?;
    Ok(driver)
}

/// Writes `table` to `path` with an explicit driver.
///
/// # Errors
///
/// Same as [`export`], minus the extension lookup.
pub fn export_with_driver(table: &GeoTable, path: &Path, driver: &Driver) -> Result<()> {
    let writer = table_writer(driver)?;
    info!(
        "Writing {} rows of '{}' to {} (Driver: {})",
        table.num_rows(),
        table.name(),
        path.display(),
        driver.short_name
    );

    let file = File::create(path).with_write_context(driver.short_name, path)?;
    let mut output = BufWriter::new(file);
    writer.write_table(&mut output, table)?;
    output.flush().with_write_context(driver.short_name, path)?;
    Ok(())
}

/// The writer implementation of `driver`.
///
/// # Errors
///
/// Returns [`DriverError::OperationNotSupported`] for drivers without write
/// support.
pub fn table_writer(driver: &Driver) -> Result<Box<dyn TableWriter>> {
    let unsupported = || DriverError::OperationNotSupported {
        driver: driver.short_name.to_string(),
        operation: "writing".to_string(),
    };
    if !driver.capabilities.write.is_supported() {
        return Err(unsupported().into());
    }
    match driver.short_name {
        "CSV" => Ok(Box::new(CsvTableWriter::new(CsvWriterOptions::default()))),
        "GeoJSON" => Ok(Box::new(GeoJsonTableWriter::new(
            GeoJsonWriterOptions::default(),
        ))),
        _ => Err(unsupported().into()),
    }
}
