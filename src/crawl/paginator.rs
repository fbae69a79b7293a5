//! Day pagination: walk one day's listing pages until they run dry.

use crate::client::PageClient;
use crate::error::HarvestError;
use crate::models::LinkRecord;
use crate::parsers::listing::parse_listing;
use chrono::NaiveDate;
use tracing::debug;

/// What one day's pagination produced.
#[derive(Debug)]
pub struct DayOutcome {
    /// Teasers gathered across the day's pages, in page order.
    pub records: Vec<LinkRecord>,
    /// True once any page of the day carried the monthly-summary signal.
    pub summary: bool,
    /// The page that failed, if pagination was cut short. Records gathered
    /// before the failure are still present above.
    pub failure: Option<(u32, HarvestError)>,
}

/// Page through `date` starting at `start_page`.
///
/// Stops at the first page that yields zero records (the day is exhausted).
/// A page that yields records is consumed even when it carries the summary
/// signal; the signal is propagated, not suppressed. A fetch error abandons
/// the failing page and stops the day; it is surfaced in the outcome for
/// the month worker to record, never raised.
pub async fn paginate_day(client: &PageClient, date: NaiveDate, start_page: u32) -> DayOutcome {
    let mut records = Vec::new();
    let mut summary = false;
    let mut page = start_page;

    loop {
        let html = match client.listing_page(date, page).await {
            Ok(html) => html,
            Err(e) => {
                debug!(%date, page, error = %e, "Listing fetch failed; abandoning day");
                return DayOutcome {
                    records,
                    summary,
                    failure: Some((page, e)),
                };
            }
        };

        let listing = parse_listing(&html, date, page);
        if listing.records.is_empty() {
            break;
        }
        records.extend(listing.records);
        summary |= listing.monthly_summary;
        page += 1;
    }

    debug!(%date, pages = page - start_page, count = records.len(), summary, "Day paginated");
    DayOutcome {
        records,
        summary,
        failure: None,
    }
}
