pub mod args;
pub mod config;
pub mod domains;
pub mod executor;
pub mod query;
pub mod recorder;
pub mod retry;
pub mod scan;
pub mod stats;
pub mod transport;
pub mod utils;

pub use args::Args;
pub use config::{Config, ConfigError};
pub use executor::{QueryExecutor, SearchOutcome};
pub use query::Hit;
pub use recorder::ResultRecorder;
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use scan::{run_scan, scan_domain_file, scan_domains};
pub use stats::{ScanReport, ScanSummary};
pub use transport::{HttpTransport, SearchTransport, TransportError, TransportResponse};
