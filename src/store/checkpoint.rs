//! Batch checkpoint artifacts for the fetch phase.
//!
//! After every batch the orchestrator persists everything resolved so far,
//! keyed by the batch's start offset: `articles_0.json`, `articles_3000.json`,
//! and so on. Each artifact supersedes the previous one, so a crash loses at
//! most the in-flight batch. Entries are sorted by their archive date, the
//! order downstream consumers expect.

use crate::error::Result;
use crate::models::ArticleRecord;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Write the accumulated results of the batch starting at `offset`.
/// Returns the artifact path.
pub async fn write_checkpoint(
    dir: &Path,
    offset: usize,
    articles: &[ArticleRecord],
) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let sorted = articles
        .iter()
        .sorted_by_key(|article| article.link.date_api)
        .collect::<Vec<_>>();
    let path = dir.join(format!("articles_{offset}.json"));
    fs::write(&path, serde_json::to_string(&sorted)?).await?;
    info!(path = %path.display(), count = sorted.len(), "Wrote batch checkpoint");
    Ok(path)
}

/// Write the final combined artifact after all batches settled.
pub async fn write_final(dir: &Path, articles: &[ArticleRecord]) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let sorted = articles
        .iter()
        .sorted_by_key(|article| article.link.date_api)
        .collect::<Vec<_>>();
    let path = dir.join("articles.json");
    fs::write(&path, serde_json::to_string(&sorted)?).await?;
    info!(path = %path.display(), count = sorted.len(), "Wrote combined article output");
    Ok(path)
}
