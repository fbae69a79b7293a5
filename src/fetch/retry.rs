//! Single-article fetch with exponential backoff.
//!
//! The backoff schedule is deliberately front-loaded slow: the wait after
//! the n-th failed attempt is `(10 + 2^n)` backoff units, so even the first
//! retry waits more than ten units. The archive's rate-limit windows are
//! long relative to single-request latency; hammering it with quick retries
//! only extends the window.

use crate::client::PageClient;
use crate::error::{HarvestError, Result};
use crate::models::{ArticleRecord, LinkRecord};
use crate::parsers::article::parse_article;
use crate::utils::truncate_for_log;
use rand::{rng, Rng};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// One attempt at resolving a link record into a full article.
pub trait FetchArticle {
    async fn fetch(&self, entry: &LinkRecord) -> Result<ArticleRecord>;
}

/// The real fetcher: download the article page through the batch's client
/// and extract the structured-data fields.
#[derive(Debug)]
pub struct ArticleFetcher<'a> {
    client: &'a PageClient,
}

impl<'a> ArticleFetcher<'a> {
    pub fn new(client: &'a PageClient) -> Self {
        Self { client }
    }
}

impl FetchArticle for ArticleFetcher<'_> {
    async fn fetch(&self, entry: &LinkRecord) -> Result<ArticleRecord> {
        let html = self.client.article_page(&entry.link).await?;
        let mut article = match parse_article(&html, entry) {
            Ok(article) => article,
            Err(e) => {
                debug!(
                    link = %entry.link,
                    preview = %truncate_for_log(&html, 200),
                    "Article parse produced nothing"
                );
                return Err(e);
            }
        };
        // processed entries carry the full URL; that is the marker the
        // link-store load path recognizes as "already fetched"
        article.link.link = self.client.absolute_link(&entry.link)?;
        Ok(article)
    }
}

/// Decorator adding bounded retries with backoff to any [`FetchArticle`].
#[derive(Debug)]
pub struct RetryFetch<T> {
    inner: T,
    max_retries: u32,
    backoff_unit: Duration,
}

impl<T> RetryFetch<T> {
    pub fn new(inner: T, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries: max_retries.max(1),
            backoff_unit: Duration::from_secs(1),
        }
    }

    /// Override the backoff time unit (one second by default).
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }
}

impl<T> FetchArticle for RetryFetch<T>
where
    T: FetchArticle,
{
    async fn fetch(&self, entry: &LinkRecord) -> Result<ArticleRecord> {
        let mut attempt = 0u32;
        loop {
            match self.inner.fetch(entry).await {
                Ok(article) => return Ok(article),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        error!(
                            link = %entry.link,
                            attempts = attempt,
                            error = %e,
                            "Article fetch exhausted retries"
                        );
                        return Err(HarvestError::RetriesExhausted {
                            link: entry.link.clone(),
                            attempts: attempt,
                        });
                    }
                    let units = 10 + (1u64 << attempt.min(20));
                    let jitter = Duration::from_millis(rng().random_range(0..=250));
                    let delay = self.backoff_unit.saturating_mul(units as u32) + jitter;
                    warn!(
                        link = %entry.link,
                        attempt,
                        max = self.max_retries,
                        retryable = e.is_retryable(),
                        ?delay,
                        error = %e,
                        "Article fetch failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchOutcome;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn entry() -> LinkRecord {
        LinkRecord {
            date_api: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            page_api: 1,
            date: "01.12.2024".to_string(),
            headline: "H".to_string(),
            short_headline: "Inland".to_string(),
            short_text: "S".to_string(),
            link: "/inland/test-100.html".to_string(),
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

    /// Fails a fixed number of times, then succeeds.
    struct ScriptedFetcher {
        failures: u32,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn failing_first(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl FetchArticle for ScriptedFetcher {
        async fn fetch(&self, entry: &LinkRecord) -> Result<ArticleRecord> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(HarvestError::EmptyArticle {
                    link: entry.link.clone(),
                })
            } else {
                Ok(article(entry))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt_with_cumulative_backoff() {
        let inner = ScriptedFetcher::failing_first(4);
        let fetcher = RetryFetch::new(inner, 5);

        let t0 = Instant::now();
        let result = fetcher.fetch(&entry()).await.unwrap();
        let elapsed = t0.elapsed();

        assert_eq!(result.article_body, "Body");
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 5);
        // waits after attempts 1..4: (10+2) + (10+4) + (10+8) + (10+16) = 70 units
        assert!(
            elapsed >= Duration::from_secs(70),
            "cumulative backoff was only {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_report_terminal_failure() {
        let inner = ScriptedFetcher::failing_first(u32::MAX);
        let fetcher = RetryFetch::new(inner, 5);

        let err = fetcher.fetch(&entry()).await.unwrap_err();
        match err {
            HarvestError::RetriesExhausted { attempts, link } => {
                assert_eq!(attempts, 5);
                assert_eq!(link, "/inland/test-100.html");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_needs_no_backoff() {
        let inner = ScriptedFetcher::failing_first(0);
        let fetcher = RetryFetch::new(inner, 5);

        let t0 = Instant::now();
        fetcher.fetch(&entry()).await.unwrap();
        assert!(t0.elapsed() < Duration::from_secs(1));
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_budget_fails_fast() {
        let inner = ScriptedFetcher::failing_first(u32::MAX);
        let fetcher = RetryFetch::new(inner, 1);

        let t0 = Instant::now();
        let err = fetcher.fetch(&entry()).await.unwrap_err();
        assert!(matches!(err, HarvestError::RetriesExhausted { attempts: 1, .. }));
        // no sleep before the terminal report
        assert!(t0.elapsed() < Duration::from_secs(1));
    }
}
