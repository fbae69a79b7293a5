//! Archive listing page parser.
//!
//! A listing page enumerates article teasers for one day, paginated via
//! `pageIndex`. Once a month lies far enough in the past the archive
//! collapses it into a single monthly overview page; that state is detected
//! here and signals the crawl to stop walking the month's remaining days.
//!
//! # Summary heuristic
//!
//! A daily page's `.archive__headline` starts with the day number
//! ("01. Dezember 2024"); a monthly overview starts with the month name
//! ("Dezember 2022"). The pinned rule: first character of the headline text
//! is non-numeric ⇒ monthly summary.

use super::element_text;
use crate::models::LinkRecord;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::trace;

static ARCHIVE_HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".archive__headline").unwrap());
static CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("div#content").unwrap());
static TEASER_WRAPPER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.copytext-element-wrapper__vertical-only").unwrap());
static TEASER_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.teaser-right__link").unwrap());
static TEASER_HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.teaser-right__headline").unwrap());
static TEASER_TOPLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.teaser-right__labeltopline").unwrap());
static TEASER_SHORTTEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.teaser-right__shorttext").unwrap());
static TEASER_DATE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.teaser-right__date").unwrap());

/// Parsed view of one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Teasers in page order. Empty means the day has no further pages.
    pub records: Vec<LinkRecord>,
    /// True when the page is a monthly overview rather than a daily listing.
    pub monthly_summary: bool,
}

/// Extract teaser records and the monthly-summary signal from raw listing
/// markup. `date` and `page` are recorded on each teaser so the fetch phase
/// and the error ledger can address the originating unit.
pub fn parse_listing(html: &str, date: NaiveDate, page: u32) -> ListingPage {
    let document = Html::parse_document(html);

    let monthly_summary = document
        .select(&ARCHIVE_HEADLINE)
        .next()
        .map(|headline| {
            let text = element_text(headline);
            text.chars().next().is_some_and(|c| !c.is_ascii_digit())
        })
        .unwrap_or(false);

    let Some(content) = document.select(&CONTENT).next() else {
        return ListingPage {
            records: Vec::new(),
            monthly_summary,
        };
    };

    // The first two wrapper elements are month navigation and dateline
    // chrome; teasers start at the third.
    let records = content
        .select(&TEASER_WRAPPER)
        .skip(2)
        .map(|teaser| {
            let link = teaser
                .select(&TEASER_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let display_date = teaser
                .select(&TEASER_DATE)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| date.format("%Y-%m-%d").to_string());
            LinkRecord {
                date_api: date,
                page_api: page,
                date: display_date,
                headline: teaser
                    .select(&TEASER_HEADLINE)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
                short_headline: teaser
                    .select(&TEASER_TOPLINE)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
                short_text: teaser
                    .select(&TEASER_SHORTTEXT)
                    .next()
                    .map(element_text)
                    .unwrap_or_default(),
                link,
            }
        })
        .collect::<Vec<_>>();

    trace!(
        %date,
        page,
        count = records.len(),
        monthly_summary,
        "Parsed listing page"
    );
    ListingPage {
        records,
        monthly_summary,
    }
}
