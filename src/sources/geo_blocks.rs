//! GeoLite2 country blocks.
//!
//! The country name is resolved to a geoname id through the locations
//! registry, then the IPv4 and IPv6 block tables are filtered on it.

use super::{column_index, open_csv, CidrSource};
use crate::config::{
    CountryConfig, GEOLITE2_BLOCKS_IPV4_FILE, GEOLITE2_BLOCKS_IPV6_FILE, GEOLITE2_LOCATIONS_FILE,
};
use crate::error::{AggregateError, Result};
use crate::models::{AggregatedSet, CidrRecord};
use std::path::{Path, PathBuf};

pub struct GeoBlocks {
    dir: PathBuf,
    exclude_anonymous_proxies: bool,
}

impl GeoBlocks {
    pub fn new(dir: impl Into<PathBuf>, exclude_anonymous_proxies: bool) -> Self {
        GeoBlocks {
            dir: dir.into(),
            exclude_anonymous_proxies,
        }
    }

    fn read_blocks(
        &self,
        path: &Path,
        geoname_id: u64,
        iso_code: &str,
    ) -> Result<Vec<CidrRecord>> {
        let mut reader = open_csv(path, true)?;
        let headers = reader.headers()?.clone();
        let columns = BlockColumns::locate(&headers, path)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let block = columns.read(&row, path)?;
            // a block only counts when it is both located in and registered to the country
            if block.geoname_id != Some(geoname_id)
                || block.registered_country_geoname_id != Some(geoname_id)
            {
                continue;
            }
            if self.exclude_anonymous_proxies
                && (block.is_anonymous_proxy || block.is_satellite_provider)
            {
                log::debug!("Skipping proxy/satellite block {}", block.network);
                continue;
            }
            records.push(CidrRecord::new(block.network, iso_code));
        }
        Ok(records)
    }
}

impl CidrSource for GeoBlocks {
    fn name(&self) -> &str {
        "GeoLite2"
    }

    fn fetch(&self, country: &CountryConfig) -> Result<AggregatedSet> {
        let registry = self.dir.join(GEOLITE2_LOCATIONS_FILE);
        let geoname_id = resolve_geoname_id(&registry, &country.name)?;
        log::debug!("GeoLite2 geoname_id for {} = {geoname_id}", country.name);

        Ok(AggregatedSet {
            ipv4: self.read_blocks(
                &self.dir.join(GEOLITE2_BLOCKS_IPV4_FILE),
                geoname_id,
                &country.iso_code,
            )?,
            ipv6: self.read_blocks(
                &self.dir.join(GEOLITE2_BLOCKS_IPV6_FILE),
                geoname_id,
                &country.iso_code,
            )?,
        })
    }
}

/// Look up the geoname id of `country_name` in the locations registry.
///
/// The first matching row wins.
pub fn resolve_geoname_id(path: &Path, country_name: &str) -> Result<u64> {
    let mut reader = open_csv(path, true)?;
    let headers = reader.headers()?.clone();
    let name_col = column_index(&headers, "country_name", path)?;
    let id_col = column_index(&headers, "geoname_id", path)?;

    for row in reader.records() {
        let row = row?;
        if row.get(name_col) == Some(country_name) {
            return parse_id(row.get(id_col).unwrap_or_default(), &row, path)?.ok_or_else(|| {
                AggregateError::format(path, format!("empty geoname_id for {country_name}"))
            });
        }
    }
    Err(AggregateError::UnknownCountryError {
        country: country_name.to_string(),
        path: path.to_path_buf(),
    })
}

/// Empty cells are `None`, anything else must be an unsigned integer.
fn parse_id(cell: &str, row: &csv::StringRecord, path: &Path) -> Result<Option<u64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse().map(Some).map_err(|_| {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        AggregateError::format(path, format!("line {line}: invalid geoname id '{cell}'"))
    })
}

struct Block {
    network: String,
    geoname_id: Option<u64>,
    registered_country_geoname_id: Option<u64>,
    is_anonymous_proxy: bool,
    is_satellite_provider: bool,
}

/// Column positions of a GeoLite2 blocks table.
struct BlockColumns {
    network: usize,
    geoname_id: usize,
    registered_country_geoname_id: usize,
    is_anonymous_proxy: usize,
    is_satellite_provider: usize,
}

impl BlockColumns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> Result<BlockColumns> {
        // represented_country_geoname_id is never read but must be present
        column_index(headers, "represented_country_geoname_id", path)?;
        Ok(BlockColumns {
            network: column_index(headers, "network", path)?,
            geoname_id: column_index(headers, "geoname_id", path)?,
            registered_country_geoname_id: column_index(
                headers,
                "registered_country_geoname_id",
                path,
            )?,
            is_anonymous_proxy: column_index(headers, "is_anonymous_proxy", path)?,
            is_satellite_provider: column_index(headers, "is_satellite_provider", path)?,
        })
    }

    fn read(&self, row: &csv::StringRecord, path: &Path) -> Result<Block> {
        let cell = move |i: usize| row.get(i).unwrap_or_default();
        Ok(Block {
            network: cell(self.network).to_string(),
            geoname_id: parse_id(cell(self.geoname_id), row, path)?,
            registered_country_geoname_id: parse_id(
                cell(self.registered_country_geoname_id),
                row,
                path,
            )?,
            is_anonymous_proxy: cell(self.is_anonymous_proxy) == "1",
            is_satellite_provider: cell(self.is_satellite_provider) == "1",
        })
    }
}
