use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Read the watch list: one entry per line, kept verbatim and in order.
/// Blank lines survive too; they turn into a match-everything pattern, so
/// each one is flagged.
pub fn load_domains(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let domains: Vec<String> = content.lines().map(str::to_string).collect();

    for (line_num, domain) in domains.iter().enumerate() {
        if domain.is_empty() {
            warn!(
                action = "load",
                component = "domain_list",
                line_number = line_num + 1,
                "Blank entry will match every record"
            );
        }
    }

    info!(
        action = "loaded",
        component = "domain_list",
        file_path = ?path,
        domain_count = domains.len(),
        "Loaded domain list"
    );
    Ok(domains)
}
