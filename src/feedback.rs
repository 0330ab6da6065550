use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

// ---------------------------------------------------------------------------
// Feedback log: opaque free-text sink, one timestamped row per submission
// ---------------------------------------------------------------------------

const HEADER: [&str; 2] = ["timestamp", "feedback"];

/// Append-only CSV log of user feedback. Failures here are reported in the
/// status line and never affect the pipeline.
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FeedbackLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one feedback entry, timestamped with the local clock.
    /// Callers should reject blank input before getting here.
    pub fn append(&self, text: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.append_at(&timestamp, text)
    }

    fn append_at(&self, timestamp: &str, text: &str) -> Result<()> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening feedback log '{}'", self.path.display()))?;

        let mut writer = csv::Writer::from_writer(file);
        if is_new {
            writer.write_record(HEADER).context("writing feedback header")?;
        }
        writer
            .write_record([timestamp, text.trim()])
            .context("writing feedback entry")?;
        writer.flush().context("flushing feedback log")?;
        Ok(())
    }

    /// Read back all submitted entries as (timestamp, feedback) pairs.
    /// A missing log is an empty list, not an error.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening feedback log '{}'", self.path.display()))?;

        let mut entries = Vec::new();
        for result in reader.records() {
            let record = result.context("reading feedback entry")?;
            let timestamp = record.get(0).unwrap_or("").to_string();
            let text = record.get(1).unwrap_or("").to_string();
            entries.push((timestamp, text));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> FeedbackLog {
        let path = std::env::temp_dir().join(name);
        std::fs::remove_file(&path).ok();
        FeedbackLog::new(path)
    }

    #[test]
    fn append_then_read_back() {
        let log = temp_log("sales_scope_feedback_roundtrip.csv");
        log.append_at("2023-05-01 12:00:00", "Great dashboard").unwrap();
        log.append_at("2023-05-01 12:05:00", "More charts, please").unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, "Great dashboard");
        assert_eq!(entries[1].0, "2023-05-01 12:05:00");

        std::fs::remove_file(log.path()).ok();
    }

    #[test]
    fn commas_in_feedback_survive_quoting() {
        let log = temp_log("sales_scope_feedback_quoting.csv");
        log.append_at("2023-05-01 12:00:00", "filters, KPIs, and charts")
            .unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries[0].1, "filters, KPIs, and charts");

        std::fs::remove_file(log.path()).ok();
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let log = temp_log("sales_scope_feedback_missing.csv");
        assert!(log.entries().unwrap().is_empty());
    }
}
