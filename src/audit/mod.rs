//! Audit sink
//!
//! Durable, append-only log of reconstructed commands: one file per local
//! OS user per calendar day, one line per committed command. Each session
//! owns its file handle, so no cross-session locking is needed.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::{Error, Result};

/// A reconstructed command, immutable once emitted and consumed exactly
/// once by the sink.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub timestamp: DateTime<Local>,
    pub principal: String,
    pub remote_host: String,
    pub text: String,
}

impl CommandRecord {
    pub fn new(
        principal: impl Into<String>,
        remote_host: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            principal: principal.into(),
            remote_host: remote_host.into(),
            text: text.into(),
        }
    }

    /// One audit line: `<timestamp> <principal> <remoteHost> <text>`.
    fn format_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.principal,
            self.remote_host,
            self.text
        )
    }
}

/// Append-only per-user-per-day audit log writer.
#[derive(Debug)]
pub struct AuditSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl AuditSink {
    /// Open (creating as needed) the audit file for today under
    /// `<log_dir>/<YYYY-MM-DD>/<local_user>.his`.
    ///
    /// Failure here is a resource error: the caller is expected to treat
    /// it as fatal at startup.
    pub fn open(log_dir: &Path, local_user: &str) -> Result<Self> {
        let day = Local::now().format("%Y-%m-%d").to_string();
        let dir = log_dir.join(day);
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Resource(format!(
                "cannot create audit log directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(format!("{}.his", local_user));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                Error::Resource(format!(
                    "cannot open audit log file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one command record, newline-terminated, flushed immediately.
    pub fn record(&mut self, record: &CommandRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.format_line())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the open audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AuditSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Local OS user the audit file is keyed by.
pub fn local_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
