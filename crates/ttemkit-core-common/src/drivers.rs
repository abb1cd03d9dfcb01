//! Export driver descriptors.
//!
//! A driver names one output format, the file extensions it is selected by,
//! and whether `ttemkit` can currently read or write it. The registry itself
//! lives in `ttemkit-core::drivers`; this module only holds the shared types so
//! format crates can describe themselves without depending on the core crate.

/// Support status for a specific driver operation.
///
/// Indicates whether a driver operation (read or write) is currently supported,
/// planned for future implementation, or not supported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The feature is fully supported and implemented.
    Supported,
    /// The feature is not supported by the driver.
    NotSupported,
    /// The feature is planned for future implementation.
    Planned,
}

impl SupportStatus {
    /// Returns `true` if the operation is fully supported and implemented.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns `true` if the operation is supported or planned (i.e., not explicitly unsupported).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, SupportStatus::NotSupported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
            SupportStatus::Planned => "Planned",
        }
    }
}

/// Operations a driver offers.
///
/// `read` refers to loading survey or well tables through the driver, `write`
/// to exporting a formatted [`GeoTable`](crate::GeoTable).
#[derive(Debug, Clone, Copy)]
pub struct DriverCapabilities {
    /// Support status for reading tables in this format.
    pub read: SupportStatus,
    /// Support status for exporting tables to this format.
    pub write: SupportStatus,
}

impl DriverCapabilities {
    /// Returns `true` if at least one operation is fully supported and implemented.
    #[must_use]
    pub fn has_supported_operation(&self) -> bool {
        self.read.is_supported() || self.write.is_supported()
    }
}

/// Tabular or vector format driver definition.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Short name used in the CLI and for driver identification (e.g., `"GeoJSON"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes.
    pub long_name: &'static str,
    /// Lower-case file extensions, without the leading dot, that select this driver.
    pub extensions: &'static [&'static str],
    /// Operations supported by this driver.
    pub capabilities: DriverCapabilities,
}

impl Driver {
    /// Creates a new driver definition with specified capabilities.
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        extensions: &'static [&'static str],
        read: SupportStatus,
        write: SupportStatus,
    ) -> Self {
        Self {
            short_name,
            long_name,
            extensions,
            capabilities: DriverCapabilities { read, write },
        }
    }

    /// Returns `true` if `extension` (with or without a leading dot, any case)
    /// selects this driver.
    #[must_use]
    pub fn matches_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_extension_ignores_case_and_dot() {
        let driver = Driver::new(
            "GeoJSON",
            "GeoJSON",
            &["geojson", "json"],
            SupportStatus::NotSupported,
            SupportStatus::Supported,
        );
        assert!(driver.matches_extension("geojson"));
        assert!(driver.matches_extension(".GeoJSON"));
        assert!(driver.matches_extension("JSON"));
        assert!(!driver.matches_extension("csv"));
    }

    #[test]
    fn test_capabilities() {
        let caps = DriverCapabilities {
            read: SupportStatus::Planned,
            write: SupportStatus::NotSupported,
        };
        assert!(!caps.has_supported_operation());
        assert!(caps.read.is_available());
        assert_eq!(caps.write.as_str(), "Not Supported");
    }
}
