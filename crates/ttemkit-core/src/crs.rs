//! Coordinate reference systems.
//!
//! A small registry maps the EPSG codes used for tTEM and well data onto
//! proj strings; coordinate math is done by [`proj4rs`]. Geographic systems
//! take and return degrees, the conversion to radians happens here.

use std::fmt;

use proj4rs::Proj;
use proj4rs::adaptors::transform_vertex_2d;

use crate::error::{CrsError, Result};

/// The default CRS of well locations.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// A parsed coordinate reference system.
#[derive(Debug, Clone)]
pub struct Crs {
    name: String,
    definition: String,
    proj: Proj,
}

impl Crs {
    /// Parses an `EPSG:<code>` identifier or a raw `+proj=` string.
    ///
    /// Known codes: 4326, 4269, 4267, 3857, WGS84 UTM 32601-32660 and
    /// 32701-32760, NAD83 UTM 26901-26923.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::UnsupportedCrs`] for unknown codes and for proj
    /// strings `proj4rs` rejects.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttemkit_core::crs::Crs;
    ///
    /// let utm = Crs::parse("epsg:32614").unwrap();
    /// assert_eq!(utm.name(), "EPSG:32614");
    /// assert_eq!(utm.epsg_code(), Some(32614));
    /// assert!(!utm.is_geographic());
    /// assert!(Crs::parse("EPSG:1234").is_err());
    /// ```
    pub fn parse(crs: &str) -> Result<Self> {
        let trimmed = crs.trim();
        let unsupported = || CrsError::UnsupportedCrs {
            crs: crs.to_string(),
        };

        let (name, definition) = if trimmed.starts_with("+proj=") {
            (trimmed.to_string(), trimmed.to_string())
        } else {
            let code = trimmed
                .get(..5)
                .filter(|prefix| prefix.eq_ignore_ascii_case("EPSG:"))
                .and_then(|_| trimmed[5..].trim().parse::<u32>().ok())
                .ok_or_else(unsupported)?;
            let definition = epsg_definition(code).ok_or_else(unsupported)?;
            (format!("EPSG:{code}"), definition)
        };

        let proj = Proj::from_proj_string(&definition).map_err(|e| {
            log::debug!("proj4rs rejected '{definition}': {e}");
            unsupported()
        })?;

        Ok(Self {
            name,
            definition,
            proj,
        })
    }

    /// Canonical name, `EPSG:<code>` or the proj string.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The proj string handed to `proj4rs`.
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// `true` for longitude/latitude systems.
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.proj.is_latlong()
    }

    /// The EPSG code when the CRS was given as one.
    #[must_use]
    pub fn epsg_code(&self) -> Option<u32> {
        self.name.strip_prefix("EPSG:")?.parse().ok()
    }

    /// Transforms one point from `self` into `target`.
    ///
    /// Geographic coordinates are `(longitude, latitude)` in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError::Transform`] when `proj4rs` fails, e.g. for a
    /// latitude out of range.
    pub fn transform_point(&self, target: &Crs, x: f64, y: f64) -> Result<(f64, f64)> {
        let input = if self.is_geographic() {
            (x.to_radians(), y.to_radians())
        } else {
            (x, y)
        };

        let (ox, oy) =
            transform_vertex_2d(&self.proj, &target.proj, input).map_err(|e| CrsError::Transform {
                x,
                y,
                from: self.name.clone(),
                to: target.name.clone(),
                message: e.to_string(),
            })?;

        if target.is_geographic() {
            Ok((ox.to_degrees(), oy.to_degrees()))
        } else {
            Ok((ox, oy))
        }
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn epsg_definition(code: u32) -> Option<String> {
    let definition = match code {
        4326 => "+proj=longlat +datum=WGS84 +no_defs".to_string(),
        4269 => "+proj=longlat +datum=NAD83 +no_defs".to_string(),
        4267 => "+proj=longlat +ellps=clrk66 +towgs84=-8,160,176 +no_defs".to_string(),
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
            .to_string(),
        32601..=32660 => format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", code - 32600),
        32701..=32760 => format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            code - 32700
        ),
        26901..=26923 => format!("+proj=utm +zone={} +datum=NAD83 +units=m +no_defs", code - 26900),
        _ => return None,
    };
    Some(definition)
}
