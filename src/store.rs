//! Per-target time-series history store
//!
//! Each target owns one append-only text file of
//! `YYYY-MM-DD HH:MM, success|failed` lines. After every append the store
//! enforces a retention cap by keeping only the most recent lines; the
//! truncation writes a temp file in the same directory and renames it over
//! the original so a crash mid-truncation cannot corrupt the history.

use crate::errors::{CheckerError, Result};
use crate::probe::Status;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// On-disk timestamp format, UTC at minute precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One parsed history line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub status: Status,
}

impl LogRecord {
    /// Parse one history line; malformed lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let (raw_timestamp, raw_status) = line.split_once(',')?;
        let timestamp =
            NaiveDateTime::parse_from_str(raw_timestamp.trim(), TIMESTAMP_FORMAT).ok()?;
        let status = Status::from_token(raw_status.trim())?;

        Some(Self { timestamp, status })
    }

    /// Format as an on-disk line, without the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}, {}", self.timestamp.format(TIMESTAMP_FORMAT), self.status)
    }
}

/// Durable per-target outcome history with rolling retention
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
    retention: usize,
}

impl HistoryStore {
    pub fn new(dir: PathBuf, retention: usize) -> Self {
        Self { dir, retention }
    }

    /// History file path for a sanitized target key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.log", key))
    }

    /// Append one record for `key`, then enforce retention
    pub async fn append(&self, key: &str, record: &LogRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.store_error("create history dir", &self.dir, e))?;

        let path = self.path_for(key);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| self.store_error("open", &path, e))?;

        file.write_all(format!("{}\n", record.to_line()).as_bytes())
            .await
            .map_err(|e| self.store_error("append to", &path, e))?;
        file.flush()
            .await
            .map_err(|e| self.store_error("flush", &path, e))?;

        self.enforce_retention(&path).await
    }

    /// Read all parsable records for `key`, oldest first.
    ///
    /// A missing file is an empty history; malformed lines are skipped.
    pub async fn read_records(&self, key: &str) -> Result<Vec<LogRecord>> {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.store_error("read", &path, e)),
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in content.lines() {
            match LogRecord::parse(line) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                "Skipped {} malformed lines in {}",
                skipped,
                path.display()
            );
        }

        Ok(records)
    }

    /// Keep only the most recent `retention` lines, atomically
    async fn enforce_retention(&self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| self.store_error("read", path, e))?;

        let lines: Vec<&str> = content.lines().collect();
        if lines.len() <= self.retention {
            return Ok(());
        }

        let retained = &lines[lines.len() - self.retention..];
        let mut body = retained.join("\n");
        body.push('\n');

        // Same directory as the target so the rename stays atomic
        let tmp = path.with_extension("log.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|e| self.store_error("write temp for", path, e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| self.store_error("replace", path, e))?;

        debug!(
            "Truncated {} from {} to {} records",
            path.display(),
            lines.len(),
            self.retention
        );

        Ok(())
    }

    fn store_error(&self, action: &str, path: &Path, err: std::io::Error) -> CheckerError {
        CheckerError::Store(format!("failed to {} {}: {}", action, path.display(), err))
    }
}
