//! Optional TOML pipeline configuration.
//!
//! ```toml
//! match_policy = "strict"
//!
//! [headers]
//! sounding = '^/?\s*ID\b'
//! doi = '^/?\s*UTMX\b'
//!
//! [columns]
//! bore = ["Well Name", "bore"]
//! keyword = ["Soil Type"]
//! ```
//!
//! Every key is optional; missing keys keep the built-in defaults. Alias lists
//! replace the defaults of their field.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ttemkit_xyz::{DOI_HEADER_PATTERN, SOUNDING_HEADER_PATTERN};

use crate::columns::{ColumnResolver, field};
use crate::error::{ConfigError, IoErrorExt, Result};
use crate::sounding::SoundingOptions;
use crate::types::MatchPolicy;
use crate::well::WellOptions;

const KNOWN_FIELDS: [&str; 7] = [
    field::BORE,
    field::DEPTH_TOP,
    field::DEPTH_BOTTOM,
    field::KEYWORD,
    field::LATITUDE,
    field::LONGITUDE,
    field::ELEVATION,
];

/// Header marker patterns of `.xyz` exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderPatterns {
    /// Sounding export header marker
    pub sounding: String,
    /// DOI export header marker
    pub doi: String,
}

impl Default for HeaderPatterns {
    fn default() -> Self {
        Self {
            sounding: SOUNDING_HEADER_PATTERN.to_string(),
            doi: DOI_HEADER_PATTERN.to_string(),
        }
    }
}

/// Settings shared by the sounding and well pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Policy for unmatched DOI and location keys
    pub match_policy: MatchPolicy,
    /// Header markers
    pub headers: HeaderPatterns,
    /// Alias overrides per canonical field
    pub columns: BTreeMap<String, Vec<String>>,
}

impl PipelineConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for malformed TOML, unknown keys,
    /// unknown column fields and empty alias lists.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::InvalidOption {
            option: "configuration".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not a valid configuration.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_read_context("configuration", path)?;
        let config = Self::from_toml(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, aliases) in &self.columns {
            if !KNOWN_FIELDS.contains(&name.as_str()) {
                return Err(ConfigError::InvalidOption {
                    option: format!("columns.{name}"),
                    message: format!("unknown field, expected one of {}", KNOWN_FIELDS.join(", ")),
                }
                .into());
            }
            if aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(ConfigError::InvalidOption {
                    option: format!("columns.{name}"),
                    message: "at least one alias is required".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// The default resolver with this configuration's overrides applied.
    #[must_use]
    pub fn column_resolver(&self) -> ColumnResolver {
        self.columns
            .iter()
            .fold(ColumnResolver::default(), |resolver, (name, aliases)| {
                resolver.with_aliases(name, aliases.iter().map(String::as_str))
            })
    }

    /// Sounding options seeded from this configuration.
    #[must_use]
    pub fn sounding_options(&self) -> SoundingOptions {
        SoundingOptions::new()
            .with_match_policy(self.match_policy)
            .with_sounding_header(self.headers.sounding.clone())
            .with_doi_header(self.headers.doi.clone())
    }

    /// Well options seeded from this configuration.
    #[must_use]
    pub fn well_options(&self) -> WellOptions {
        WellOptions::new()
            .with_match_policy(self.match_policy)
            .with_columns(self.column_resolver())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtemError;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.headers.sounding, SOUNDING_HEADER_PATTERN);
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_toml(
            r#"
match_policy = "strict"

[headers]
doi = '^DOI'

[columns]
keyword = ["Soil Type", "keyword"]
"#,
        )
        .unwrap();

        assert_eq!(config.match_policy, MatchPolicy::Strict);
        assert_eq!(config.headers.doi, "^DOI");
        assert_eq!(config.headers.sounding, SOUNDING_HEADER_PATTERN);

        let resolver = config.column_resolver();
        assert_eq!(resolver.aliases(field::KEYWORD), ["Soil Type", "keyword"]);
        assert_eq!(resolver.aliases(field::BORE)[0], "bore");

        let options = config.well_options();
        assert_eq!(options.match_policy, MatchPolicy::Strict);
        assert_eq!(config.sounding_options().doi_header, "^DOI");
    }

    #[test]
    fn test_rejects_unknown_field_and_key() {
        let err = PipelineConfig::from_toml("[columns]\ncolour = [\"c\"]\n").unwrap_err();
        assert!(matches!(err, TtemError::Config(ConfigError::InvalidOption { .. })));

        assert!(PipelineConfig::from_toml("resample = 10\n").is_err());
        assert!(PipelineConfig::from_toml("[columns]\nbore = [\" \"]\n").is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ttemkit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "match_policy = \"lenient\"").unwrap();

        let config = PipelineConfig::from_path(&path).unwrap();
        assert_eq!(config.match_policy, MatchPolicy::Lenient);

        let err = PipelineConfig::from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, TtemError::Io(_)));

        std::fs::write(&path, "match_policy = 3").unwrap();
        let err = PipelineConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, TtemError::Config(ConfigError::Parse { .. })));
    }
}
