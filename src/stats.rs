use std::path::PathBuf;
use std::time::Duration;

use crate::executor::SearchOutcome;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub domains_scanned: usize,
    pub domains_matched: usize,
    pub rows_written: u64,
    pub no_hits: usize,
    pub api_errors: usize,
    pub transient_failures: usize,
    pub malformed_responses: usize,
}

impl ScanSummary {
    pub fn record(&mut self, outcome: &SearchOutcome) {
        self.domains_scanned += 1;
        match outcome {
            SearchOutcome::Hit(_) => self.domains_matched += 1,
            SearchOutcome::NoHit => self.no_hits += 1,
            SearchOutcome::TransientFailure { .. } => self.transient_failures += 1,
            SearchOutcome::ApiError { .. } => self.api_errors += 1,
            SearchOutcome::MalformedResponse { .. } => self.malformed_responses += 1,
        }
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub output_path: PathBuf,
    pub domain_list: PathBuf,
    /// The domain list could not be found; nothing was queried.
    pub domain_list_missing: bool,
    pub summary: ScanSummary,
    pub duration: Duration,
}
