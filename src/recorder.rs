use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use csv::{Terminator, WriterBuilder};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::query::Hit;

pub const HEADER: [&str; 3] = ["URL", "Timestamp", "Message"];

/// `dns_results_<Mon>_<DD>_<YYYY>_<HHMMSS>_<client_ip>.csv`
pub fn output_file_name<Tz>(started_at: &DateTime<Tz>, client_ip: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "dns_results_{}_{}.csv",
        started_at.format("%b_%d_%Y_%H%M%S"),
        client_ip
    )
}

/// Append-only CSV sink for search hits. Holds no file handle: every row is
/// its own open/write/close cycle.
#[derive(Debug, Clone)]
pub struct ResultRecorder {
    path: PathBuf,
    rows_written: u64,
}

impl ResultRecorder {
    /// Create the file with a header row unless it already exists. An
    /// existing file is left exactly as it is.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            debug!(
                action = "init",
                component = "result_recorder",
                file_path = ?path,
                "Output file already exists"
            );
        } else {
            let file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            write_row(file, &HEADER)
                .with_context(|| format!("Failed to write header to {:?}", path))?;
            info!(
                action = "init",
                component = "result_recorder",
                file_path = ?path,
                "Created output file"
            );
        }

        Ok(Self {
            path,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn append(&mut self, hit: &Hit) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file {:?}", self.path))?;
        write_row(file, &[&hit.domain, &hit.timestamp, &hit.message])
            .with_context(|| format!("Failed to append to {:?}", self.path))?;

        self.rows_written += 1;
        Ok(())
    }
}

/// One CSV record, CRLF-terminated, flushed before the writer goes away.
fn write_row<W, I>(out: W, fields: I) -> csv::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(out);
    writer.write_record(fields)?;
    writer.flush()?;
    Ok(())
}
