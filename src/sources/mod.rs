//! Input adapters.
//!
//! Each adapter reads one input format and yields the records of a single
//! country split by address family:
//! - [`range_table`] - start/end range table summarized into CIDR blocks
//! - [`geo_blocks`] - GeoLite2 country blocks joined on the locations registry
//! - [`cidr_list`] - optional pre-built per-country CIDR lists
//! - [`html_registry`] - first table of an HTML spreadsheet export

mod cidr_list;
mod geo_blocks;
mod html_registry;
mod range_table;

pub use cidr_list::CidrList;
pub use geo_blocks::{resolve_geoname_id, GeoBlocks};
pub use html_registry::{extract_table_column, HtmlRegistry};
pub use range_table::RangeTable;

use crate::config::{Config, CountryConfig, SourceKind};
use crate::error::{AggregateError, Result};
use crate::models::AggregatedSet;
use std::fs::File;
use std::path::Path;

/// Capability shared by all adapters: records for one requested country.
pub trait CidrSource {
    /// Name used in log output.
    fn name(&self) -> &str;

    fn fetch(&self, country: &CountryConfig) -> Result<AggregatedSet>;
}

/// Build the adapter for one configured source kind.
pub fn build_source(kind: SourceKind, config: &Config) -> Box<dyn CidrSource> {
    match kind {
        SourceKind::RangeTable => Box::new(RangeTable::new(config.range_table_path())),
        SourceKind::GeoBlocks => Box::new(GeoBlocks::new(
            config.geolite2_path(),
            config.exclude_anonymous_proxies,
        )),
        SourceKind::AutonomousSystems => Box::new(CidrList::new(
            "autonomous systems",
            config.autonomous_systems_path(),
        )),
        SourceKind::Manual => Box::new(CidrList::new("manual", config.manual_path())),
        SourceKind::HtmlRegistry => Box::new(HtmlRegistry::new(config.html_registry_path())),
    }
}

/// Build the adapters enabled for `country`, in configured order.
pub fn build_sources(country: &CountryConfig, config: &Config) -> Vec<Box<dyn CidrSource>> {
    country
        .sources
        .iter()
        .map(|kind| build_source(*kind, config))
        .collect()
}

/// Open a mandatory CSV file, failing with `MissingFileError` when absent.
pub(crate) fn open_csv(path: &Path, has_headers: bool) -> Result<csv::Reader<File>> {
    if !path.is_file() {
        return Err(AggregateError::MissingFileError(path.to_path_buf()));
    }
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(AggregateError::from)
}

/// Position of a named column in the header row.
pub(crate) fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AggregateError::format(path, format!("column '{name}' not found")))
}
