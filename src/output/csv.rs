//! CSV writer for the aggregated networks.

use crate::error::{AggregateError, Result};
use crate::models::CidrRecord;
use std::path::Path;

/// Header row of the output file.
pub const CSV_HEADER: [&str; 2] = ["Network", "Country"];

/// Write the IPv4 records followed by the IPv6 records to `path`.
///
/// Creates the parent directory if needed and overwrites an existing file.
///
/// # Returns
/// * `Ok(usize)` - number of data rows written
pub fn write_csv(path: &Path, ipv4: &[CidrRecord], ipv6: &[CidrRecord]) -> Result<usize> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| AggregateError::io(dir, e))?;
    }

    // header is written by hand so an empty set still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for record in ipv4.iter().chain(ipv6) {
        writer.serialize(record)?;
        rows += 1;
    }
    writer.flush().map_err(|e| AggregateError::io(path, e))?;

    log::info!("Wrote {rows} rows to {}", path.display());
    Ok(rows)
}
