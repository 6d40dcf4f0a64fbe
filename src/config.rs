//! Run configuration.
//!
//! Defaults reproduce the fixed layout of the data directory. A JSON file can
//! override any field; missing fields keep their default.

use crate::error::{AggregateError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "geo_cidr_aggregate.json";

pub const GEOLITE2_LOCATIONS_FILE: &str = "GeoLite2-Country-Locations-en.csv";
pub const GEOLITE2_BLOCKS_IPV4_FILE: &str = "GeoLite2-Country-Blocks-IPv4.csv";
pub const GEOLITE2_BLOCKS_IPV6_FILE: &str = "GeoLite2-Country-Blocks-IPv6.csv";

lazy_static! {
    static ref ISO_CODE: Regex = Regex::new(r"^[A-Z]{2}$").expect("Invalid Regex?");
}

/// Input sources a country can be aggregated from.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Start/end range table (DB-IP country lite).
    RangeTable,
    /// GeoLite2 country blocks joined on the locations registry.
    GeoBlocks,
    /// Pre-built per-country autonomous system CIDR lists.
    AutonomousSystems,
    /// Manually curated per-country CIDR lists.
    Manual,
    /// HTML spreadsheet export of an intranet registry.
    HtmlRegistry,
}

/// A country to aggregate and the sources enabled for it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CountryConfig {
    /// Display name, as written in the GeoLite2 locations file.
    pub name: String,
    pub iso_code: String,
    pub sources: Vec<SourceKind>,
}

impl CountryConfig {
    pub fn new(name: &str, iso_code: &str, sources: &[SourceKind]) -> Self {
        CountryConfig {
            name: name.to_string(),
            iso_code: iso_code.to_string(),
            sources: sources.to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    /// Range table file name, inside `data_dir`.
    pub range_table_file: String,
    /// HTML export file name, inside `data_dir`.
    pub html_registry_file: String,
    pub geolite2_dir: String,
    pub autonomous_systems_dir: String,
    pub manual_dir: String,
    /// Drop GeoLite2 rows flagged as anonymous proxy or satellite provider.
    pub exclude_anonymous_proxies: bool,
    /// Remove exact duplicates from the IPv6 set.
    pub drop_duplicate_ipv6: bool,
    pub countries: Vec<CountryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        use SourceKind::*;
        Config {
            data_dir: PathBuf::from("./Data"),
            output_dir: PathBuf::from("./Aggregated_Data"),
            output_file: "agg_cidrs.csv".to_string(),
            range_table_file: "dbip-country-lite-2023-01.csv".to_string(),
            html_registry_file: "Export-14011020215714.xls".to_string(),
            geolite2_dir: "GeoLite2".to_string(),
            autonomous_systems_dir: "AS_CIDRs".to_string(),
            manual_dir: "Manual".to_string(),
            exclude_anonymous_proxies: false,
            drop_duplicate_ipv6: true,
            countries: vec![
                CountryConfig::new(
                    "Iran",
                    "IR",
                    &[RangeTable, GeoBlocks, AutonomousSystems, Manual, HtmlRegistry],
                ),
                CountryConfig::new("China", "CN", &[RangeTable, GeoBlocks, AutonomousSystems, Manual]),
                CountryConfig::new("Russia", "RU", &[RangeTable, GeoBlocks, AutonomousSystems, Manual]),
            ],
        }
    }
}

impl Config {
    /// Load the config from `config_file`, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// # Returns
    /// * `Ok(Config)` - parsed config, or defaults when no file is found
    /// * `Err` - if the given file does not exist or fails to parse
    pub fn load(config_file: Option<&str>) -> Result<Config> {
        let config_file = match config_file {
            Some(file) => {
                if !Path::new(file).exists() {
                    return Err(AggregateError::ConfigError(format!(
                        "Config file does not exist: {file}"
                    )));
                }
                log::info!("Using provided config file: {file}");
                file
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => DEFAULT_CONFIG_FILE,
            None => {
                log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
                let config = Config::default();
                config.validate()?;
                return Ok(config);
            }
        };

        let json = std::fs::read_to_string(config_file)
            .map_err(|e| AggregateError::io(config_file, e))?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Config> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let config: Config = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            AggregateError::ConfigError(format!("path={} error={}", e.path(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for country in &self.countries {
            if !ISO_CODE.is_match(&country.iso_code) {
                return Err(AggregateError::ConfigError(format!(
                    "Invalid ISO code '{}' for {}",
                    country.iso_code, country.name
                )));
            }
        }
        Ok(())
    }

    pub fn range_table_path(&self) -> PathBuf {
        self.data_dir.join(&self.range_table_file)
    }

    pub fn html_registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.html_registry_file)
    }

    pub fn geolite2_path(&self) -> PathBuf {
        self.data_dir.join(&self.geolite2_dir)
    }

    pub fn autonomous_systems_path(&self) -> PathBuf {
        self.data_dir.join(&self.autonomous_systems_dir)
    }

    pub fn manual_path(&self) -> PathBuf {
        self.data_dir.join(&self.manual_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.countries.len(), 3);
        assert_eq!(
            config.range_table_path(),
            PathBuf::from("./Data/dbip-country-lite-2023-01.csv")
        );
        assert_eq!(
            config.output_path(),
            PathBuf::from("./Aggregated_Data/agg_cidrs.csv")
        );
        let with_html: Vec<&str> = config
            .countries
            .iter()
            .filter(|c| c.sources.contains(&SourceKind::HtmlRegistry))
            .map(|c| c.iso_code.as_str())
            .collect();
        assert_eq!(with_html, vec!["IR"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{
                "data_dir": "/tmp/geo",
                "countries": [
                    { "name": "Russia", "iso_code": "RU", "sources": ["range_table", "manual"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/geo"));
        assert_eq!(config.output_file, "agg_cidrs.csv");
        assert_eq!(
            config.countries[0].sources,
            vec![SourceKind::RangeTable, SourceKind::Manual]
        );
    }

    #[test]
    fn test_bad_json_reports_path() {
        let err = Config::from_json(r#"{ "countries": [ { "name": "Iran", "iso_code": "IR", "sources": ["ftp"] } ] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("countries[0]"), "{err}");
    }

    #[test]
    fn test_invalid_iso_code() {
        let err = Config::from_json(
            r#"{ "countries": [ { "name": "Iran", "iso_code": "iran", "sources": [] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::ConfigError(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(Config::load(Some("does/not/exist.json")).is_err());
    }
}
