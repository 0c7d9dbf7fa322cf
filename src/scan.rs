use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

use crate::config::Config;
use crate::domains::load_domains;
use crate::executor::QueryExecutor;
use crate::recorder::{output_file_name, ResultRecorder};
use crate::retry::{Sleeper, ThreadSleeper};
use crate::stats::{ScanReport, ScanSummary};
use crate::transport::{HttpTransport, SearchTransport};
use crate::Args;

/// Full run against the live store: create the results file, then search
/// every domain in the list.
pub fn run_scan(args: &Args, config: &Config, started_at: DateTime<Local>) -> Result<ScanReport> {
    let output_path = args
        .output_dir
        .join(output_file_name(&started_at, &config.client_ip));
    let mut recorder = ResultRecorder::init(&output_path)?;

    let transport = HttpTransport::new(config)?;
    let executor = QueryExecutor::from_config(transport, ThreadSleeper, config);

    scan_domain_file(&executor, &mut recorder, &args.domains)
}

/// Load `domain_list` and search each entry in order. A missing list ends
/// the scan early without an error.
pub fn scan_domain_file<T, S>(
    executor: &QueryExecutor<T, S>,
    recorder: &mut ResultRecorder,
    domain_list: &Path,
) -> Result<ScanReport>
where
    T: SearchTransport,
    S: Sleeper,
{
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "scan",
        file_path = ?domain_list,
        "Starting DNS log scan"
    );

    let (domain_list_missing, summary) = match load_domains(domain_list) {
        Ok(domains) => (false, scan_domains(executor, recorder, &domains)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!(
                action = "load",
                component = "domain_list",
                file_path = ?domain_list,
                "Domain list file not found"
            );
            (true, ScanSummary::default())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read domain list {:?}", domain_list));
        }
    };

    let duration = start_time.elapsed();
    info!(
        action = "complete",
        component = "scan",
        domains_scanned = summary.domains_scanned,
        domains_matched = summary.domains_matched,
        rows_written = summary.rows_written,
        duration_ms = duration.as_millis(),
        "Scan finished"
    );

    Ok(ScanReport {
        output_path: recorder.path().to_path_buf(),
        domain_list: domain_list.to_path_buf(),
        domain_list_missing,
        summary,
        duration,
    })
}

/// One search per domain, strictly in sequence.
pub fn scan_domains<T, S>(
    executor: &QueryExecutor<T, S>,
    recorder: &mut ResultRecorder,
    domains: &[String],
) -> Result<ScanSummary>
where
    T: SearchTransport,
    S: Sleeper,
{
    let rows_before = recorder.rows_written();
    let mut summary = ScanSummary::default();

    for domain in domains {
        let outcome = executor.check_domain(domain, recorder)?;
        summary.record(&outcome);
    }

    summary.rows_written = recorder.rows_written() - rows_before;
    Ok(summary)
}

pub fn print_scan_report(report: &ScanReport) {
    let summary = &report.summary;

    println!("\n--- DNS Log Scan ---");

    if report.domain_list_missing {
        println!("Domain list not found: {}", report.domain_list.display());
    } else {
        println!(
            "Domains scanned: {}",
            crate::utils::format_number(summary.domains_scanned as u64)
        );
        println!(
            "Domains with hits: {}",
            crate::utils::format_number(summary.domains_matched as u64)
        );
        println!(
            "Rows written: {}",
            crate::utils::format_number(summary.rows_written)
        );

        let failed =
            summary.api_errors + summary.transient_failures + summary.malformed_responses;
        if failed > 0 {
            println!(
                "Domains not searched: {} ({} API errors, {} network failures, {} unreadable \
                 responses)",
                crate::utils::format_number(failed as u64),
                summary.api_errors,
                summary.transient_failures,
                summary.malformed_responses
            );
        }
    }

    println!("Results file: {}", report.output_path.display());
    println!("Elapsed: {:.1}s", report.duration.as_secs_f64());
}
