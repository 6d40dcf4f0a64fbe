//! DB-IP style range table: header-less `start,end,country` rows.

use super::{open_csv, CidrSource};
use crate::config::CountryConfig;
use crate::error::{AggregateError, Result};
use crate::models::{AddressRange, AggregatedSet, CidrRecord};
use itertools::Itertools;
use std::path::{Path, PathBuf};

pub struct RangeTable {
    path: PathBuf,
}

impl RangeTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RangeTable { path: path.into() }
    }
}

impl CidrSource for RangeTable {
    fn name(&self) -> &str {
        "DB-IP range table"
    }

    fn fetch(&self, country: &CountryConfig) -> Result<AggregatedSet> {
        let mut reader = open_csv(&self.path, false)?;
        let iso_code = country.iso_code.as_str();

        let records: Vec<CidrRecord> = reader
            .records()
            .map(|row| row.map_err(AggregateError::from))
            // short rows are kept so range_from_row reports them
            .filter_ok(|row| row.get(2).map_or(true, |code| code == iso_code))
            .map(|row| row.and_then(|row| range_from_row(&row, &self.path)?.to_cidr_records()))
            .flatten_ok()
            .collect::<Result<_>>()?;

        log::debug!(
            "{}: {} CIDR blocks for {iso_code} from {}",
            self.name(),
            records.len(),
            self.path.display()
        );
        Ok(AggregatedSet::from_records(records))
    }
}

/// Positional columns: Range_Start, Range_End, Country.
fn range_from_row(row: &csv::StringRecord, path: &Path) -> Result<AddressRange> {
    if row.len() < 3 {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        return Err(AggregateError::format(
            path,
            format!("line {line}: expected 3 columns, got {}", row.len()),
        ));
    }
    AddressRange::parse(&row[0], &row[1], &row[2])
}
