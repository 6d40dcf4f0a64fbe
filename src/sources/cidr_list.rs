//! Pre-built `Network,Country` lists, one file per country and family.
//!
//! Used for both the autonomous system and the manual lists. A missing file
//! is an empty contribution, not an error.

use super::{column_index, CidrSource};
use crate::config::CountryConfig;
use crate::error::{AggregateError, Result};
use crate::models::{AddressFamily, AggregatedSet, CidrRecord};
use std::path::{Path, PathBuf};

pub struct CidrList {
    name: String,
    dir: PathBuf,
}

impl CidrList {
    pub fn new(name: &str, dir: impl Into<PathBuf>) -> Self {
        CidrList {
            name: name.to_string(),
            dir: dir.into(),
        }
    }

    /// `<dir>/ipv4_<ISO>.csv` or `<dir>/ipv6_<ISO>.csv`.
    pub fn list_path(&self, iso_code: &str, family: AddressFamily) -> PathBuf {
        let prefix = match family {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        };
        self.dir.join(format!("{prefix}_{iso_code}.csv"))
    }

    fn read_list(&self, path: &Path) -> Result<Vec<CidrRecord>> {
        if !path.is_file() {
            log::debug!("{}: no list at {}", self.name, path.display());
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        column_index(&headers, "Network", path)?;
        column_index(&headers, "Country", path)?;

        reader
            .deserialize::<CidrRecord>()
            .map(|row| row.map_err(|e| AggregateError::format(path, e.to_string())))
            .collect()
    }
}

impl CidrSource for CidrList {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, country: &CountryConfig) -> Result<AggregatedSet> {
        Ok(AggregatedSet {
            ipv4: self.read_list(&self.list_path(&country.iso_code, AddressFamily::Ipv4))?,
            ipv6: self.read_list(&self.list_path(&country.iso_code, AddressFamily::Ipv6))?,
        })
    }
}
