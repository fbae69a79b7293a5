//! Error taxonomy for the harvest pipeline.
//!
//! The variants map onto the propagation policy used throughout the crate:
//! transport errors are retryable, parse failures abandon the affected page
//! or entry only, and `RetriesExhausted` is the terminal per-entry outcome
//! that is reported to the caller rather than raised. Only `InvalidRange`,
//! `Io` and `Config` may abort the whole process, and only at startup.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// Transport-level failure (connect, timeout, non-success status).
    /// The remote archive gives no distinct rate-limit signal, so suspected
    /// rate limiting surfaces here as well and gets the same backoff.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listing url could not be built: {0}")]
    Url(#[from] url::ParseError),

    /// Article markup carried no usable `NewsArticle` data. Retryable: the
    /// archive intermittently serves interstitial pages under load.
    #[error("no article data found at {link}")]
    EmptyArticle { link: String },

    /// All retry attempts for one entry are used up. Reported, never raised
    /// across the batch boundary.
    #[error("retries exhausted after {attempts} attempts for {link}")]
    RetriesExhausted { link: String, attempts: u32 },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
    /// Whether the retry layer should attempt this entry again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HarvestError::Http(_) | HarvestError::EmptyArticle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = HarvestError::RetriesExhausted {
            link: "/inland/test-100.html".to_string(),
            attempts: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("/inland/test-100.html"));
    }

    #[test]
    fn test_empty_article_is_retryable() {
        let err = HarvestError::EmptyArticle {
            link: "/x".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_range_is_not_retryable() {
        let err = HarvestError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(!err.is_retryable());
    }
}
