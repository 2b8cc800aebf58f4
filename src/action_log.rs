//! Append-only outcome log
//!
//! Every package action and system update step is recorded as one
//! timestamped line, `YYYY-MM-DD HH:MM:SS - LEVEL - message`. The log is
//! constructed explicitly and handed to whoever records outcomes; nothing
//! reads it back. Records are mirrored to `tracing` at debug level.

use crate::error::{Result, SetupError};
use chrono::{Local, NaiveDateTime};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use strum::Display;
use tracing::{debug, warn};

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Error,
}

/// Format one record line (without trailing newline)
pub fn format_record(timestamp: NaiveDateTime, level: LogLevel, message: &str) -> String {
    format!(
        "{} - {} - {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// Outcome log sink
pub struct ActionLog {
    writer: Box<dyn Write + Send>,
    path: Option<PathBuf>,
}

impl ActionLog {
    /// Open `path` for appending, creating it (and its parent directory) if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                SetupError::config(format!("Failed to open log file {}: {}", path.display(), e))
            })?;
        Ok(Self {
            writer: Box::new(file),
            path: Some(path.to_path_buf()),
        })
    }

    /// Log into an arbitrary writer
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            path: None,
        }
    }

    /// Log that discards every record
    pub fn discard() -> Self {
        Self::from_writer(std::io::sink())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!("{}", message);
        self.record(LogLevel::Info, message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!(severity = "error", "{}", message);
        self.record(LogLevel::Error, message);
    }

    // A failing log write must never stop package work
    fn record(&mut self, level: LogLevel, message: &str) {
        let line = format_record(Local::now().naive_local(), level, message);
        let written = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush());
        if let Err(e) = written {
            warn!("Failed to write outcome log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_format_record() {
        let timestamp = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            format_record(timestamp, LogLevel::Info, "nginx installed successfully."),
            "2026-01-02 03:04:05 - INFO - nginx installed successfully."
        );
        assert_eq!(
            format_record(timestamp, LogLevel::Error, "boom"),
            "2026-01-02 03:04:05 - ERROR - boom"
        );
    }

    #[test]
    fn test_open_appends_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("server-setup.log");

        {
            let mut log = ActionLog::open(&path).unwrap();
            log.info("first");
        }
        {
            let mut log = ActionLog::open(&path).unwrap();
            assert_eq!(log.path(), Some(path.as_path()));
            log.error("second");
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" - INFO - first"));
        assert!(lines[1].ends_with(" - ERROR - second"));
    }

    #[test]
    fn test_open_fails_on_directory() {
        let dir = TempDir::new().unwrap();
        assert!(ActionLog::open(dir.path()).is_err());
    }

    #[test]
    fn test_discard_accepts_records() {
        let mut log = ActionLog::discard();
        log.info("ignored");
        assert!(log.path().is_none());
    }
}
