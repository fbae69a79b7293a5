//! Month worker: one month's days, processed in order by one worker.

use crate::client::PageClient;
use crate::crawl::paginator::paginate_day;
use crate::crawl::scheduler::ActiveMonths;
use crate::error::Result;
use crate::models::{ErrorRecord, LinkRecord, MonthTask};
use crate::store::errors::ErrorLedger;
use crate::store::links::LinkStore;
use tracing::{info, warn};

/// Process one month and append its records to the link store.
///
/// Days run ascending. Once any day's pagination observed the monthly
/// summary signal the remaining days are skipped: the archive has collapsed
/// them into a rollup page that carries no new per-day links. A failed
/// listing page is recorded in the error ledger immediately and stops only
/// its day. The month's records land in the store as one bulk write at the
/// end, keeping lock contention to one append per month.
///
/// The worker registers itself in `active` on entry and deregisters on
/// every exit path, so the progress snapshot never shows a finished month.
pub async fn run_month(
    client: &PageClient,
    task: &MonthTask,
    store: &LinkStore,
    ledger: &ErrorLedger,
    active: &ActiveMonths,
) -> Result<Vec<LinkRecord>> {
    let label = task.label();
    active.insert(&label);
    let result = run_month_inner(client, task, store, ledger).await;
    active.remove(&label);
    result
}

async fn run_month_inner(
    client: &PageClient,
    task: &MonthTask,
    store: &LinkStore,
    ledger: &ErrorLedger,
) -> Result<Vec<LinkRecord>> {
    let mut summary_detected = false;
    let mut month_records = Vec::new();

    for (index, day) in task.days.iter().enumerate() {
        if summary_detected {
            info!(month = %task.label(), last_day = %day, "Monthly summary reached; skipping remaining days");
            break;
        }
        let start_page = if index == 0 { task.resume_page } else { 1 };
        let outcome = paginate_day(client, *day, start_page).await;

        if let Some((page, error)) = outcome.failure {
            warn!(date = %day, page, error = %error, "Listing page failed; day abandoned");
            if let Err(ledger_err) = ledger
                .record(ErrorRecord {
                    date: *day,
                    page,
                    message: error.to_string(),
                })
                .await
            {
                warn!(error = %ledger_err, "Could not persist error record");
            }
        }

        month_records.extend(outcome.records);
        summary_detected |= outcome.summary;
    }

    store.append(&month_records).await?;
    info!(
        month = %task.label(),
        count = month_records.len(),
        summary_detected,
        "Month completed"
    );
    Ok(month_records)
}
