use geo_cidr_aggregate::config::Config;
use geo_cidr_aggregate::output::print_summary;
use geo_cidr_aggregate::{run, RunOutcome};
use std::error::Error;

/// Exit status when the base data directory is missing.
const EXIT_MISSING_DATA_DIR: i32 = 2;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs: {e}"))?;
    log::info!("#Start main()");

    let config = Config::load(None)?;
    match run(&config)? {
        RunOutcome::Written(summary) => print_summary(&summary),
        RunOutcome::MissingDataDir(dir) => {
            eprintln!("Database directory '{}' was not found!", dir.display());
            std::process::exit(EXIT_MISSING_DATA_DIR);
        }
    }

    Ok(())
}
