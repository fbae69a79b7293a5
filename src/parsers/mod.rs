//! HTML parsing for the two page shapes the archive serves.
//!
//! Both parsers are pure functions over raw markup:
//!
//! - [`listing::parse_listing`]: archive listing page → ordered teaser
//!   records plus the monthly-summary signal
//! - [`article::parse_article`]: article page → enriched record from the
//!   embedded `NewsArticle` JSON-LD block
//!
//! Selectors are compiled once and pinned by tests; the archive's markup is
//! the contract here, not these modules.

pub mod article;
pub mod listing;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collected text of an element with runs of whitespace collapsed, the
/// equivalent of the archive markup's rendered text.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(raw.trim(), " ").to_string()
}
