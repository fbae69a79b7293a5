//! The append-only link log.
//!
//! One JSON-serialized [`LinkRecord`] per line, UTF-8, appended in bulk
//! under a process-wide mutex: the log is one physical resource, so
//! concurrent month workers serialize on it. Records are never rewritten
//! here; the fetch phase marks progress by writing full-URL entries to its
//! own artifacts, which is what [`LinkRecord::is_fetched`] keys on at load
//! time.

use crate::error::Result;
use crate::models::LinkRecord;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct LinkStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records as one flushed bulk write. Callers serialize on the
    /// store's mutex, so concurrent appends never interleave lines.
    pub async fn append(&self, records: &[LinkRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        info!(count = records.len(), path = %self.path.display(), "Appended link records");
        Ok(())
    }

    /// Load every record still awaiting the fetch phase.
    ///
    /// Malformed lines are skipped, not fatal: a crash mid-append can leave
    /// one truncated line at the tail. Records whose `link` already carries
    /// a full URL are filtered as fetched.
    pub async fn load_pending(&self) -> Result<Vec<LinkRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Link log does not exist yet");
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut pending = Vec::new();
        let mut skipped = 0usize;
        for line in raw.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str::<LinkRecord>(line) {
                Ok(record) if record.is_fetched() => {}
                Ok(record) => pending.push(record),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, path = %self.path.display(), "Skipped malformed link log lines");
        }
        info!(count = pending.len(), "Loaded pending link records");
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, link: &str) -> LinkRecord {
        LinkRecord {
            date_api: NaiveDate::from_ymd_opt(2024, 12, day).unwrap(),
            page_api: 1,
            date: format!("{day:02}.12.2024"),
            headline: format!("Headline {day}"),
            short_headline: "Inland".to_string(),
            short_text: "Short".to_string(),
            link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("links.jsonl"));
        let records = vec![record(1, "/a-100.html"), record(2, "/b-102.html")];

        store.append(&records).await.unwrap();
        let loaded = store.load_pending().await.unwrap();
        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_appends_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("links.jsonl"));

        store.append(&[record(1, "/a")]).await.unwrap();
        store.append(&[record(2, "/b")]).await.unwrap();
        let loaded = store.load_pending().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].link, "/a");
        assert_eq!(loaded[1].link, "/b");
    }

    #[tokio::test]
    async fn test_full_url_records_are_filtered_as_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("links.jsonl"));
        store
            .append(&[
                record(1, "/pending-100.html"),
                record(2, "https://www.tagesschau.de/done-100.html"),
            ])
            .await
            .unwrap();

        let loaded = store.load_pending().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].link, "/pending-100.html");
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.jsonl");
        let store = LinkStore::new(&path);
        store.append(&[record(1, "/a")]).await.unwrap();
        // simulate a crash mid-append leaving a truncated tail line
        let mut raw = tokio::fs::read_to_string(&path).await.unwrap();
        raw.push_str("{\"date_api\":\"2024-12-0");
        tokio::fs::write(&path, raw).await.unwrap();

        let loaded = store.load_pending().await.unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LinkStore::new(dir.path().join("absent.jsonl"));
        assert!(store.load_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_append_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.jsonl");
        let store = LinkStore::new(&path);
        store.append(&[]).await.unwrap();
        assert!(!path.exists());
    }
}
