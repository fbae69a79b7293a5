//! HTTP access to the archive: one GET per page, no retry logic.
//!
//! Retries and backoff live in the fetch layer; the crawl layer treats a
//! failed page as abandoned. Keeping this client dumb keeps both policies
//! in one place each.

use crate::config::HarvestConfig;
use crate::error::Result;
use chrono::NaiveDate;
use tracing::debug;
use url::Url;

/// Thin wrapper around a [`reqwest::Client`] bound to one archive origin.
///
/// Each crawl run owns one client; the fetch phase builds a fresh one per
/// batch so connection state never leaks across the cooldown pause.
#[derive(Debug, Clone)]
pub struct PageClient {
    http: reqwest::Client,
    archive_url: String,
    origin: Url,
}

impl PageClient {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            archive_url: config.archive_url.clone(),
            origin: Url::parse(&config.origin)?,
        })
    }

    /// Fetch one archive listing page for a day.
    pub async fn listing_page(&self, date: NaiveDate, page: u32) -> Result<String> {
        let url = Url::parse_with_params(
            &self.archive_url,
            &[
                ("datum", date.format("%Y-%m-%d").to_string()),
                ("pageIndex", page.to_string()),
            ],
        )?;
        debug!(%url, "Fetching listing page");
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetch one article page via its relative link from a listing teaser.
    pub async fn article_page(&self, link: &str) -> Result<String> {
        let url = self.origin.join(link)?;
        debug!(%url, "Fetching article page");
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Absolute form of a relative article link, used when rewriting
    /// processed entries.
    pub fn absolute_link(&self, link: &str) -> Result<String> {
        Ok(self.origin.join(link)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PageClient {
        PageClient::new(&HarvestConfig::default()).unwrap()
    }

    #[test]
    fn test_absolute_link_resolves_relative_path() {
        let client = client();
        assert_eq!(
            client.absolute_link("/inland/test-100.html").unwrap(),
            "https://www.tagesschau.de/inland/test-100.html"
        );
    }

    #[test]
    fn test_listing_page_url_shape() {
        // pin the query parameter names the archive expects
        let url = Url::parse_with_params(
            "https://www.tagesschau.de/archiv",
            &[("datum", "2024-12-01"), ("pageIndex", "3")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.tagesschau.de/archiv?datum=2024-12-01&pageIndex=3"
        );
    }
}
