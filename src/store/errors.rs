//! The error ledger: failed listing units, one record per (date, page).
//!
//! Written read-modify-rewrite on every failure so nothing is lost on a
//! crash. The ledger is informative and single-process; it is not guarded
//! against concurrent writers from other processes.

use crate::error::Result;
use crate::models::ErrorRecord;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ErrorLedger {
    path: PathBuf,
}

impl ErrorLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist one failure immediately.
    pub async fn record(&self, record: ErrorRecord) -> Result<()> {
        let mut records = self.load().await.unwrap_or_else(|e| {
            warn!(error = %e, path = %self.path.display(), "Error ledger unreadable; starting fresh");
            Vec::new()
        });
        warn!(date = %record.date, page = record.page, message = %record.message, "Recording failed listing unit");
        records.push(record);
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<Vec<ErrorRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The (date, resume page) pairs a `collect-after` run should replay.
    pub async fn resume_points(&self) -> Result<Vec<(NaiveDate, u32)>> {
        let records = self.load().await?;
        let points: Vec<(NaiveDate, u32)> = records
            .iter()
            .map(|record| (record.date, record.page))
            .collect();
        info!(count = points.len(), "Loaded resume points from error ledger");
        Ok(points)
    }
}
