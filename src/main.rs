use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::error;

use dnswatch::{scan, utils, Args, Config};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    let config = match Config::from_env(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(action = "configure", component = "config", error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let report = scan::run_scan(&args, &config, Local::now())?;
    scan::print_scan_report(&report);

    Ok(())
}
