//! Aggregate IP-to-country sources into one de-duplicated CSV of CIDR networks.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod sources;

use std::collections::HashSet;
use std::path::PathBuf;

use config::Config;
use error::{AggregateError, Result};
use models::{AggregatedSet, CidrRecord, NetworkParts};
use output::{banner, write_csv};
use processing::{aggregate_country, drop_exact_duplicates, expand_ipv4};
use sources::build_sources;

/// Record counts gathered for one country, before de-duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySummary {
    pub iso_code: String,
    pub ipv4: usize,
    pub ipv6: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub countries: Vec<CountrySummary>,
    pub ipv4_total: usize,
    pub ipv6_total: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Written(RunSummary),
    /// The base data directory is absent; nothing was read or written.
    MissingDataDir(PathBuf),
}

/// Aggregate every configured country and write the output CSV.
///
/// The output file is only touched once every source has been read and
/// de-duplicated without error.
pub fn run(config: &Config) -> Result<RunOutcome> {
    if !config.data_dir.is_dir() {
        log::error!(
            "Database directory '{}' was not found!",
            config.data_dir.display()
        );
        return Ok(RunOutcome::MissingDataDir(config.data_dir.clone()));
    }

    let mut aggregated = AggregatedSet::new();
    let mut countries = Vec::new();
    for country in &config.countries {
        banner(&format!("Aggregating data for {}", country.name));
        let sources = build_sources(country, config);
        let set = aggregate_country(&sources, country)?;
        countries.push(CountrySummary {
            iso_code: country.iso_code.clone(),
            ipv4: set.ipv4.len(),
            ipv6: set.ipv6.len(),
        });
        aggregated.extend(set);
    }

    banner("Cleaning up duplicates");
    let ipv4 = expand_ipv4(aggregated.ipv4)?;
    check_for_duplicate_networks(&ipv4)?;
    let ipv6 = if config.drop_duplicate_ipv6 {
        drop_exact_duplicates(aggregated.ipv6)
    } else {
        aggregated.ipv6
    };

    let output = config.output_path();
    log::info!("Saving CSV to {}", output.display());
    write_csv(&output, &ipv4, &ipv6)?;

    Ok(RunOutcome::Written(RunSummary {
        countries,
        ipv4_total: ipv4.len(),
        ipv6_total: ipv6.len(),
        output,
    }))
}

// return error if a base address occurs more than once
pub fn check_for_duplicate_networks(records: &[CidrRecord]) -> Result<()> {
    let mut seen = HashSet::new();

    for record in records {
        let parts = NetworkParts::new(&record.network)?;
        if !seen.insert(parts.base) {
            return Err(AggregateError::DuplicateNetworkError(format!(
                "{} ({})",
                record.network, record.country
            )));
        }
    }
    Ok(())
}
