use clap::Parser;
use std::path::PathBuf;

use crate::query::DEFAULT_INDEX_PATTERN;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dnswatch",
    about = "Search Elasticsearch DNS logs for a client's lookups of watched domains",
    version,
    long_about = None
)]
pub struct Args {
    /// Newline-delimited list of domain fragments to search for
    #[arg(short, long, default_value = "pi_blocklist_porn_top1m")]
    pub domains: PathBuf,

    /// Directory the CSV results file is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Index pattern the search targets
    #[arg(long, default_value = DEFAULT_INDEX_PATTERN)]
    pub index_pattern: String,

    /// Attempts per domain when the network fails
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,

    /// Seconds to wait between attempts after a network failure
    #[arg(long, default_value_t = 10)]
    pub retry_delay: u64,

    /// Seconds to pause after a non-200 response
    #[arg(long, default_value_t = 5)]
    pub error_pause: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Maximum hits returned per domain (store default when unset)
    #[arg(long)]
    pub max_hits: Option<u32>,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
