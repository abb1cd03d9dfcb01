//! USGS groundwater-level client.
//!
//! Downloads the tab-separated (RDB) water-level report and the inventory page
//! of a USGS monitoring well, and turns them into typed observations and site
//! metadata. Requests are blocking and are not retried.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use reqwest::blocking::Client;
use ttemkit_core_common::GeoTable;

use crate::crs::Crs;
use crate::error::{RemoteError, Result};
use crate::table::BatchBuilder;

/// Multiply feet by this to get meters.
pub const FEET_TO_METERS: f64 = 0.3048;

const REPORT_URL: &str = "https://nwis.waterdata.usgs.gov/nwis/gwlevels";
const INVENTORY_URL: &str = "https://waterdata.usgs.gov/nwis/inventory";

static INVENTORY_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<title>USGS ([^<]*\d)  [^<]*</title>.*?Latitude  (.*?), &nbsp; Longitude (.*?) &nbsp; (.*?)<br />.*?Well depth: (\S*) .*?Land surface altitude:  (.*?)feet above",
    )
});

/// Converts feet to meters.
#[must_use]
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * FEET_TO_METERS
}

/// Extracts the USGS site number from a well name.
///
/// An all-digit name is the site number; otherwise the first run of digits
/// is used.
///
/// # Errors
///
/// Returns [`RemoteError::InvalidSiteName`] when `name` contains no digits.
///
/// # Examples
///
/// ```
/// use ttemkit_core::water_level::site_number;
///
/// assert_eq!(site_number("375006112554801").unwrap(), "375006112554801");
/// assert_eq!(site_number("USGS 375006112554801 (C-34-11)").unwrap(), "375006112554801");
/// assert!(site_number("Parowan").is_err());
/// ```
pub fn site_number(name: &str) -> Result<String> {
    let name = name.trim();
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return Err(RemoteError::InvalidSiteName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(digits)
}

/// URL of the RDB water-level report of `site`.
#[must_use]
pub fn report_url(site: &str) -> String {
    format!("{REPORT_URL}?site_no={site}&agency_cd=USGS&format=rdb")
}

/// URL of the inventory page of `site`.
#[must_use]
pub fn inventory_url(site: &str) -> String {
    format!("{INVENTORY_URL}?agency_code=USGS&site_no={site}")
}

fn get_text(client: &Client, url: &str) -> Result<String> {
    let failure = |e: reqwest::Error| RemoteError::RemoteFetchFailure {
        url: url.to_string(),
        message: e.to_string(),
    };
    log::debug!("GET {url}");
    let body = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::text)
        .map_err(failure)?;
    Ok(body)
}

/// Downloads and parses the water-level report of `site`.
///
/// # Errors
///
/// Returns [`RemoteError::RemoteFetchFailure`] for network and HTTP status
/// failures and [`RemoteError::RemoteParse`] for an unreadable report.
pub fn fetch_report(client: &Client, site: &str) -> Result<WaterLevelReport> {
    parse_rdb(&get_text(client, &report_url(site))?)
}

/// Downloads and scrapes the inventory page of `site`.
///
/// # Errors
///
/// Same as [`fetch_report`].
pub fn fetch_metadata(client: &Client, site: &str) -> Result<SiteMetadata> {
    parse_inventory(&get_text(client, &inventory_url(site))?)
}

/// Site description scraped from the inventory page.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMetadata {
    /// Site name from the page title
    pub site_name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees, negative west
    pub longitude: f64,
    /// Horizontal datum, e.g. `NAD27`
    pub datum: String,
    /// Well depth in feet
    pub well_depth_ft: Option<f64>,
    /// Land-surface altitude in feet
    pub altitude_ft: Option<f64>,
}

fn parse_error(what: &str, message: impl Into<String>) -> crate::error::TtemError {
    RemoteError::RemoteParse {
        what: what.to_string(),
        message: message.into(),
    }
    .into()
}

/// Decimal degrees of a `37&#176;50'06"` style coordinate.
fn parse_dms(text: &str) -> Option<f64> {
    let cleaned = text.replace("&#176;", " ").replace("&deg;", " ").replace('°', " ");
    let mut parts = cleaned
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|p| !p.is_empty())
        .map(str::parse::<f64>);
    let degrees = parts.next()?.ok()?;
    let minutes = parts.next().transpose().ok()?.unwrap_or(0.0);
    let seconds = parts.next().transpose().ok()?.unwrap_or(0.0);
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Scrapes an inventory page.
///
/// # Errors
///
/// Returns [`RemoteError::RemoteParse`] when the page does not have the
/// expected layout.
pub fn parse_inventory(html: &str) -> Result<SiteMetadata> {
    const WHAT: &str = "inventory page";
    let pattern = INVENTORY_PATTERN
        .as_ref()
        .map_err(|e| parse_error(WHAT, e.to_string()))?;
    let captures = pattern
        .captures(html)
        .ok_or_else(|| parse_error(WHAT, "site description not found"))?;
    let group = |i: usize| captures.get(i).map_or("", |m| m.as_str()).trim();

    let latitude = parse_dms(group(2))
        .ok_or_else(|| parse_error(WHAT, format!("bad latitude '{}'", group(2))))?;
    let longitude = parse_dms(group(3))
        .ok_or_else(|| parse_error(WHAT, format!("bad longitude '{}'", group(3))))?;
    let altitude_ft = group(6)
        .split_whitespace()
        .next()
        .and_then(|a| a.replace(',', "").parse().ok());

    Ok(SiteMetadata {
        site_name: group(1).to_string(),
        latitude,
        longitude: -longitude.abs(),
        datum: group(4).to_string(),
        well_depth_ft: group(5).replace(',', "").parse().ok(),
        altitude_ft,
    })
}

/// One row of a water-level report.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Site number
    pub site_no: String,
    /// Measurement date; `None` for partial dates such as `1950-07`
    pub date: Option<NaiveDate>,
    /// Measurement date as written
    pub date_text: String,
    /// Depth to water below land surface in feet (`lev_va`)
    pub depth_ft: Option<f64>,
    /// Water-level elevation in feet (`sl_lev_va`)
    pub elevation_ft: Option<f64>,
    /// Vertical datum of `elevation_ft` (`sl_datum_cd`)
    pub vertical_datum: Option<String>,
}

impl Observation {
    /// The level selected by `kind`, in meters.
    #[must_use]
    pub fn level_m(&self, kind: &LevelKind) -> Option<f64> {
        match kind {
            LevelKind::Depth => self.depth_ft,
            LevelKind::Elevation(_) => self.elevation_ft,
        }
        .map(feet_to_meters)
    }

    fn in_month(&self, year: i32, month: u32) -> bool {
        match self.date {
            Some(date) => date.year() == year && date.month() == month,
            None => self.date_text.starts_with(&format!("{year:04}-{month:02}")),
        }
    }
}

/// Which water level a report is filtered on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelKind {
    /// Water-level elevation referenced to a vertical datum, e.g. `NAVD88`
    Elevation(String),
    /// Depth to water below land surface
    Depth,
}

/// Parsed RDB water-level report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterLevelReport {
    /// Observations in report order
    pub observations: Vec<Observation>,
}

/// Parses an RDB report.
///
/// `#` lines are comments. The header row starts with `agency_cd\tsite_no` and
/// is followed by a column-format row, which is skipped. `lev_va`, `sl_lev_va`
/// and `sl_datum_cd` are optional columns.
///
/// # Errors
///
/// Returns [`RemoteError::RemoteParse`] when the header row or a required
/// column is missing, or a level is not a number.
pub fn parse_rdb(text: &str) -> Result<WaterLevelReport> {
    const WHAT: &str = "water-level report";
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with('#'));

    let headers: Vec<&str> = lines
        .by_ref()
        .find(|(_, line)| line.starts_with("agency_cd\tsite_no"))
        .map(|(_, line)| line.split('\t').map(str::trim).collect())
        .ok_or_else(|| parse_error(WHAT, "header row 'agency_cd\tsite_no' not found"))?;
    lines.next();

    let column = |name: &str| headers.iter().position(|h| *h == name);
    let site = column("site_no").ok_or_else(|| parse_error(WHAT, "missing column 'site_no'"))?;
    let date = column("lev_dt").ok_or_else(|| parse_error(WHAT, "missing column 'lev_dt'"))?;
    let depth = column("lev_va");
    let elevation = column("sl_lev_va");
    let datum = column("sl_datum_cd");

    let mut observations = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let field = |i: Option<usize>| i.and_then(|i| fields.get(i).copied()).unwrap_or("");
        let number = |i: Option<usize>| -> Result<Option<f64>> {
            let value = field(i);
            if value.is_empty() {
                return Ok(None);
            }
            value.parse().map(Some).map_err(|_| {
                parse_error(WHAT, format!("line {}: '{value}' is not a number", index + 1))
            })
        };

        let date_text = field(Some(date)).to_string();
        observations.push(Observation {
            site_no: field(Some(site)).to_string(),
            date: NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").ok(),
            date_text,
            depth_ft: number(depth)?,
            elevation_ft: number(elevation)?,
            vertical_datum: Some(field(datum)).filter(|d| !d.is_empty()).map(str::to_string),
        });
    }

    Ok(WaterLevelReport { observations })
}

impl WaterLevelReport {
    /// Observations that carry the level selected by `kind`.
    #[must_use]
    pub fn filter(&self, kind: &LevelKind) -> Self {
        let observations = self
            .observations
            .iter()
            .filter(|o| match kind {
                LevelKind::Elevation(datum) => {
                    o.elevation_ft.is_some() && o.vertical_datum.as_deref() == Some(datum.as_str())
                },
                LevelKind::Depth => o.depth_ft.is_some(),
            })
            .cloned()
            .collect();
        Self { observations }
    }

    /// The first observation of `year`-`month` in report order.
    #[must_use]
    pub fn first_in_month(&self, year: i32, month: u32) -> Option<&Observation> {
        self.observations.iter().find(|o| o.in_month(year, month))
    }

    /// The observation with the latest full date.
    #[must_use]
    pub fn latest(&self) -> Option<&Observation> {
        self.observations
            .iter()
            .filter(|o| o.date.is_some())
            .max_by_key(|o| o.date)
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` when there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// The geographic CRS of a horizontal datum name; unknown datums are taken
/// as WGS84.
///
/// # Errors
///
/// Only fails if the built-in CRS definitions cannot be parsed.
pub fn datum_crs(datum: &str) -> Result<Crs> {
    let code = match datum.trim().to_uppercase().as_str() {
        "NAD27" => "EPSG:4267",
        "NAD83" => "EPSG:4269",
        _ => "EPSG:4326",
    };
    Crs::parse(code)
}

/// One well's level, ready to be mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLevel {
    /// Site number
    pub site_no: String,
    /// Inventory metadata
    pub metadata: SiteMetadata,
    /// The selected observation, if any
    pub observation: Option<Observation>,
    /// What `level_m` measures
    pub kind: LevelKind,
    /// The selected level in meters
    pub level_m: Option<f64>,
}

impl SiteLevel {
    /// Water-table elevation in meters.
    ///
    /// A depth to water is subtracted from the land-surface altitude; an
    /// elevation level is returned as is.
    #[must_use]
    pub fn water_elevation_m(&self) -> Option<f64> {
        match self.kind {
            LevelKind::Depth => {
                Some(feet_to_meters(self.metadata.altitude_ft?) - self.level_m?)
            },
            LevelKind::Elevation(_) => self.level_m,
        }
    }
}

/// Point table of site levels with coordinates transformed from each site's
/// datum into `target`.
///
/// # Errors
///
/// Returns [`CrsError::Transform`](crate::error::CrsError::Transform) when a
/// location cannot be transformed.
pub fn site_levels_geo_table(sites: &[SiteLevel], target: &Crs) -> Result<GeoTable> {
    let mut xs = Vec::with_capacity(sites.len());
    let mut ys = Vec::with_capacity(sites.len());
    for site in sites {
        let source = datum_crs(&site.metadata.datum)?;
        let (x, y) =
            source.transform_point(target, site.metadata.longitude, site.metadata.latitude)?;
        xs.push(x);
        ys.push(y);
    }

    let batch = BatchBuilder::default()
        .utf8("Site_no", sites.iter().map(|s| s.site_no.clone()).collect())
        .utf8(
            "Site_name",
            sites.iter().map(|s| s.metadata.site_name.clone()).collect(),
        )
        .utf8("Datum", sites.iter().map(|s| s.metadata.datum.clone()).collect())
        .utf8(
            "Date",
            sites
                .iter()
                .map(|s| s.observation.as_ref().map(|o| o.date_text.clone()).unwrap_or_default())
                .collect(),
        )
        .nullable_float64("Level_m", sites.iter().map(|s| s.level_m).collect())
        .nullable_float64(
            "Altitude_m",
            sites
                .iter()
                .map(|s| s.metadata.altitude_ft.map(feet_to_meters))
                .collect(),
        )
        .nullable_float64(
            "Water_Elevation_m",
            sites.iter().map(SiteLevel::water_elevation_m).collect(),
        )
        .float64("X", xs)
        .float64("Y", ys)
        .finish()?;
    Ok(GeoTable::try_new(batch, "X", "Y", target.name())?.with_name("water_levels"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtemError;

    const RDB: &str = "# U.S. Geological Survey\n\
# Groundwater levels\n\
agency_cd\tsite_no\tsite_tp_cd\tlev_dt\tlev_tm\tlev_tz_cd\tlev_va\tsl_lev_va\tsl_datum_cd\tlev_status_cd\n\
5s\t15s\t6s\t10d\t5d\t6s\t12s\t12s\t10s\t1s\n\
USGS\t375006112554801\tGW\t1950-07\t\t\t42.10\t\t\t1\n\
USGS\t375006112554801\tGW\t2020-03-04\t\t\t50.25\t5540.10\tNAVD88\t1\n\
USGS\t375006112554801\tGW\t2020-03-18\t\t\t51.00\t5539.35\tNGVD29\t1\n\
USGS\t375006112554801\tGW\t2021-03-02\t\t\t\t5538.00\tNAVD88\t1\n";

    const INVENTORY: &str = "<html><head><title>USGS 375006112554801  (C-34- 9)28bcc- 1</title></head>\n\
<body><div>Iron County, Utah<br />\n\
Latitude  37&#176;50'06\", &nbsp; Longitude 112&#176;55'48\" &nbsp; NAD27<br />\n\
Land-surface elevation 5,560 feet<br />\n\
Well depth: 120 feet<br />\n\
Land surface altitude:  5,560.00 feet above NGVD29.</div></body></html>";

    #[test]
    fn test_parse_rdb() {
        let report = parse_rdb(RDB).unwrap();
        assert_eq!(report.len(), 4);

        let first = &report.observations[0];
        assert_eq!(first.date, None);
        assert_eq!(first.date_text, "1950-07");
        assert_eq!(first.depth_ft, Some(42.1));
        assert_eq!(first.vertical_datum, None);

        let second = &report.observations[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2020, 3, 4));
        assert_eq!(second.elevation_ft, Some(5540.1));
        assert_eq!(second.vertical_datum.as_deref(), Some("NAVD88"));
    }

    #[test]
    fn test_filter_by_kind() {
        let report = parse_rdb(RDB).unwrap();

        let navd88 = report.filter(&LevelKind::Elevation("NAVD88".to_string()));
        let dates: Vec<&str> = navd88.observations.iter().map(|o| o.date_text.as_str()).collect();
        assert_eq!(dates, vec!["2020-03-04", "2021-03-02"]);

        let depth = report.filter(&LevelKind::Depth);
        assert_eq!(depth.len(), 3);
    }

    #[test]
    fn test_first_in_month_and_latest() {
        let report = parse_rdb(RDB).unwrap();
        let march = report.first_in_month(2020, 3).unwrap();
        assert_eq!(march.date_text, "2020-03-04");
        assert!(report.first_in_month(2019, 3).is_none());
        assert_eq!(report.first_in_month(1950, 7).unwrap().date_text, "1950-07");
        assert_eq!(report.latest().unwrap().date_text, "2021-03-02");

        let level = march.level_m(&LevelKind::Depth).unwrap();
        assert!((level - 50.25 * 0.3048).abs() < 1e-9);
    }

    #[test]
    fn test_rdb_without_header_fails() {
        let err = parse_rdb("# nothing here\n").unwrap_err();
        assert!(matches!(err, TtemError::Remote(RemoteError::RemoteParse { .. })));
    }

    #[test]
    fn test_rdb_rejects_bad_number() {
        let text = "agency_cd\tsite_no\tlev_dt\tlev_va\n5s\t15s\t10d\t12s\nUSGS\t1\t2020-01-01\tdry\n";
        let err = parse_rdb(text).unwrap_err();
        assert!(err.to_string().contains("'dry' is not a number"));
    }

    #[test]
    fn test_parse_inventory() {
        let meta = parse_inventory(INVENTORY).unwrap();
        assert_eq!(meta.site_name, "375006112554801");
        assert_eq!(meta.datum, "NAD27");
        assert!((meta.latitude - (37.0 + 50.0 / 60.0 + 6.0 / 3600.0)).abs() < 1e-9);
        assert!((meta.longitude + (112.0 + 55.0 / 60.0 + 48.0 / 3600.0)).abs() < 1e-9);
        assert_eq!(meta.well_depth_ft, Some(120.0));
        assert_eq!(meta.altitude_ft, Some(5560.0));
    }

    #[test]
    fn test_parse_inventory_rejects_other_pages() {
        assert!(parse_inventory("<html><title>No sites</title></html>").is_err());
    }

    #[test]
    fn test_site_levels_table() {
        let meta = parse_inventory(INVENTORY).unwrap();
        let site = SiteLevel {
            site_no: "375006112554801".to_string(),
            metadata: meta,
            observation: None,
            kind: LevelKind::Depth,
            level_m: None,
        };
        let target = Crs::parse("EPSG:32612").unwrap();
        let table = site_levels_geo_table(&[site], &target).unwrap();
        assert_eq!(table.num_rows(), 1);
        let (x, y) = table.xy(0).unwrap();
        assert!((300_000.0..400_000.0).contains(&x), "easting {x}");
        assert!((4_150_000.0..4_250_000.0).contains(&y), "northing {y}");
        assert!(table.batch().column_by_name("Water_Elevation_m").is_some());
    }

    #[test]
    fn test_water_elevation_from_depth_and_altitude() {
        let site = SiteLevel {
            site_no: "375006112554801".to_string(),
            metadata: parse_inventory(INVENTORY).unwrap(),
            observation: None,
            kind: LevelKind::Depth,
            level_m: Some(30.0),
        };
        let expected = feet_to_meters(5560.0) - 30.0;
        assert!((site.water_elevation_m().unwrap() - expected).abs() < 1e-9);

        let navd = SiteLevel {
            kind: LevelKind::Elevation("NAVD88".to_string()),
            level_m: Some(1650.0),
            ..site.clone()
        };
        assert_eq!(navd.water_elevation_m(), Some(1650.0));

        let unknown = SiteLevel {
            level_m: None,
            ..site
        };
        assert_eq!(unknown.water_elevation_m(), None);
    }

    #[test]
    fn test_site_number_and_urls() {
        assert_eq!(site_number(" 12345 ").unwrap(), "12345");
        assert!(report_url("12345").ends_with("site_no=12345&agency_cd=USGS&format=rdb"));
        assert!(inventory_url("12345").ends_with("agency_code=USGS&site_no=12345"));
    }
}
