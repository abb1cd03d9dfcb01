//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting drivers, station summaries and water levels in a
//! human-readable format.

use tabled::{Table, Tabled};

use ttemkit_core::drivers::Driver;
use ttemkit_core::{DropReport, SiteLevel, StationSummary};

/// Number of stations shown by [`display_station_summary`].
pub const SUMMARY_PREVIEW_ROWS: usize = 10;

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// Short identifier for the driver (e.g., `GeoJSON`, `CSV`).
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver format.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// File extensions that select the driver on export.
    #[tabled(rename = "Extensions")]
    pub extensions: String,
    /// Support status for reading data from this format.
    #[tabled(rename = "Read")]
    pub read: String,
    /// Support status for writing data to this format.
    #[tabled(rename = "Write")]
    pub write: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            short_name: driver.short_name.to_string(),
            long_name: driver.long_name.to_string(),
            extensions: driver.extensions.join(", "),
            read: driver.capabilities.read.as_str().to_string(),
            write: driver.capabilities.write.as_str().to_string(),
        }
    }
}

/// One station of the sounding summary.
#[derive(Tabled)]
pub struct StationRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Depth max")]
    pub depth_bottom_max: String,
    #[tabled(rename = "Elevation min")]
    pub elevation_end_min: String,
    #[tabled(rename = "Res. min")]
    pub resistivity_min: String,
    #[tabled(rename = "Res. mean")]
    pub resistivity_mean: String,
    #[tabled(rename = "Res. max")]
    pub resistivity_max: String,
    #[tabled(rename = "UTMX")]
    pub utmx: String,
    #[tabled(rename = "UTMY")]
    pub utmy: String,
}

impl From<&StationSummary> for StationRow {
    fn from(s: &StationSummary) -> Self {
        Self {
            id: s.id,
            depth_bottom_max: format!("{:.2}", s.depth_bottom_max),
            elevation_end_min: format!("{:.2}", s.elevation_end_min),
            resistivity_min: format!("{:.2}", s.resistivity_min),
            resistivity_mean: format!("{:.2}", s.resistivity_mean),
            resistivity_max: format!("{:.2}", s.resistivity_max),
            utmx: format!("{:.1}", s.utmx_mean),
            utmy: format!("{:.1}", s.utmy_mean),
        }
    }
}

/// One monitoring well of a water-level run.
#[derive(Tabled)]
pub struct SiteRow {
    #[tabled(rename = "Site")]
    pub site_no: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Datum")]
    pub datum: String,
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[tabled(rename = "Longitude")]
    pub longitude: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Level (m)")]
    pub level_m: String,
}

impl From<&SiteLevel> for SiteRow {
    fn from(site: &SiteLevel) -> Self {
        Self {
            site_no: site.site_no.clone(),
            name: site.metadata.site_name.clone(),
            datum: site.metadata.datum.clone(),
            latitude: format!("{:.5}", site.metadata.latitude),
            longitude: format!("{:.5}", site.metadata.longitude),
            date: site
                .observation
                .as_ref()
                .map_or_else(|| "N/A".to_string(), |o| o.date_text.clone()),
            level_m: site
                .level_m
                .map_or_else(|| "N/A".to_string(), |l| format!("{l:.2}")),
        }
    }
}

/// Print the driver registry.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());
    let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Print the first [`SUMMARY_PREVIEW_ROWS`] stations.
pub fn display_station_summary(stations: &[StationSummary]) {
    println!("\n=== Stations ({} total) ===", stations.len());
    let rows: Vec<StationRow> = stations
        .iter()
        .take(SUMMARY_PREVIEW_ROWS)
        .map(StationRow::from)
        .collect();
    println!("{}", Table::new(rows));
    if stations.len() > SUMMARY_PREVIEW_ROWS {
        println!("... {} more", stations.len() - SUMMARY_PREVIEW_ROWS);
    }
}

/// Print the selected level of every well.
pub fn display_site_levels(sites: &[SiteLevel]) {
    println!("\n=== Water Levels ===");
    let rows: Vec<SiteRow> = sites.iter().map(SiteRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Print the groups a lenient join removed, if any.
pub fn display_drop_report(label: &str, report: &DropReport) {
    if report.is_empty() {
        return;
    }
    println!("\n{label}: {report}");
    for group in report.groups() {
        println!("  - {} ({} rows)", group.key, group.rows);
    }
}
