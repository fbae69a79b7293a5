//! Batch orchestration for the fetch phase.

use crate::client::PageClient;
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::fetch::retry::{ArticleFetcher, FetchArticle, RetryFetch};
use crate::models::{ArticleRecord, LinkRecord};
use crate::store::checkpoint;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tokio::time::sleep;
use tracing::{info, warn};

/// Works the fetch backlog in fixed-size batches.
///
/// Each batch owns a fresh [`PageClient`] (and with it a fresh connection
/// pool), runs its entries with bounded in-flight concurrency, and ends
/// with a checkpoint of everything accumulated so far. Between batches the
/// orchestrator sleeps a fixed cooldown to stay under the archive's
/// informal rate limit. A crash therefore loses at most the open batch.
#[derive(Debug)]
pub struct BatchFetchOrchestrator {
    config: HarvestConfig,
    checkpoint_dir: PathBuf,
}

impl BatchFetchOrchestrator {
    pub fn new(config: HarvestConfig, checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    /// Fetch every entry, at most `concurrency` in flight at a time.
    /// Returns the successfully resolved articles; terminal failures are
    /// logged and excluded.
    pub async fn fetch_all(
        &self,
        entries: &[LinkRecord],
        concurrency: usize,
    ) -> Result<Vec<ArticleRecord>> {
        let batch_size = self.config.batch_size;
        let total_batches = entries.len().div_ceil(batch_size);
        let mut results: Vec<ArticleRecord> = Vec::new();

        for (index, batch) in entries.chunks(batch_size).enumerate() {
            let offset = index * batch_size;
            info!(
                batch = index + 1,
                total_batches,
                offset,
                size = batch.len(),
                concurrency,
                "Fetching batch"
            );

            // session per batch; connection state never outlives the pause
            let client = PageClient::new(&self.config)?;
            let fetcher = RetryFetch::new(ArticleFetcher::new(&client), self.config.max_retries)
                .with_backoff_unit(self.config.backoff_unit());
            let (collected, terminal) = drain_batch(&fetcher, batch, concurrency).await;
            if terminal {
                warn!(
                    batch = index + 1,
                    collected = collected.len(),
                    "Batch closed out early after a terminal failure"
                );
            }
            results.extend(collected);

            checkpoint::write_checkpoint(&self.checkpoint_dir, offset, &results).await?;

            if offset + batch_size < entries.len() {
                info!(cooldown_secs = self.config.cooldown_secs, "Cooling down before next batch");
                sleep(self.config.cooldown()).await;
            }
        }

        info!(
            resolved = results.len(),
            dropped = entries.len() - results.len(),
            "Fetch phase complete"
        );
        Ok(results)
    }
}

/// Run one batch's entries with bounded concurrency, draining completions
/// in completion order. The first terminal failure stops the drain early;
/// results already collected are returned (and will be checkpointed).
async fn drain_batch<F>(
    fetcher: &F,
    batch: &[LinkRecord],
    concurrency: usize,
) -> (Vec<ArticleRecord>, bool)
where
    F: FetchArticle,
{
    let mut inflight = stream::iter(batch)
        .map(|entry| fetcher.fetch(entry))
        .buffer_unordered(concurrency.max(1));

    let mut collected = Vec::new();
    let mut terminal = false;
    while let Some(result) = inflight.next().await {
        match result {
            Ok(article) => collected.push(article),
            Err(e) => {
                warn!(error = %e, "Terminal fetch failure; closing out batch");
                terminal = true;
                break;
            }
        }
    }
    (collected, terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvestError;
    use crate::models::FetchOutcome;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn entry(link: &str) -> LinkRecord {
        LinkRecord {
            date_api: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            page_api: 1,
            date: "01.12.2024".to_string(),
            headline: "H".to_string(),
            short_headline: "Inland".to_string(),
            short_text: "S".to_string(),
            link: link.to_string(),
        }
    }

    fn article(entry: &LinkRecord) -> ArticleRecord {
        ArticleRecord {
            link: entry.clone(),
            label: String::new(),
            article_body: "Body".to_string(),
            date_published: String::new(),
            author: String::new(),
            description: String::new(),
            taglist: Vec::new(),
            outcome: FetchOutcome::Success,
        }
    }

    /// Tracks how many fetches run simultaneously.
    struct GaugeFetcher {
        current: AtomicUsize,
        high_water: AtomicUsize,
    }

    impl GaugeFetcher {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
            }
        }
    }

    impl FetchArticle for GaugeFetcher {
        async fn fetch(&self, entry: &LinkRecord) -> crate::error::Result<ArticleRecord> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(article(entry))
        }
    }

    /// Fails exactly the entries whose link contains "fail".
    struct SelectiveFetcher;

    impl FetchArticle for SelectiveFetcher {
        async fn fetch(&self, entry: &LinkRecord) -> crate::error::Result<ArticleRecord> {
            if entry.link.contains("fail") {
                Err(HarvestError::RetriesExhausted {
                    link: entry.link.clone(),
                    attempts: 5,
                })
            } else {
                Ok(article(entry))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let entries: Vec<LinkRecord> = (0..10).map(|i| entry(&format!("/a-{i}.html"))).collect();
        let fetcher = GaugeFetcher::new();

        let (collected, terminal) = drain_batch(&fetcher, &entries, 3).await;
        assert_eq!(collected.len(), 10);
        assert!(!terminal);
        assert_eq!(fetcher.high_water.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_failure_stops_drain_keeping_prior_results() {
        let entries = vec![
            entry("/ok-1.html"),
            entry("/ok-2.html"),
            entry("/fail-3.html"),
            entry("/ok-4.html"),
        ];
        // concurrency 1 makes completion order deterministic
        let (collected, terminal) = drain_batch(&SelectiveFetcher, &entries, 1).await;
        assert!(terminal);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].link.link, "/ok-1.html");
        assert_eq!(collected[1].link.link, "/ok-2.html");
    }

    #[tokio::test]
    async fn test_empty_backlog_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = BatchFetchOrchestrator::new(HarvestConfig::default(), dir.path());
        let results = orchestrator.fetch_all(&[], 3).await.unwrap();
        assert!(results.is_empty());
        // no batches ran, so no checkpoint artifacts exist
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
