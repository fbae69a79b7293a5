//! Range partitioning and the bounded month-worker pool.

use crate::client::PageClient;
use crate::crawl::month::run_month;
use crate::error::{HarvestError, Result};
use crate::models::{month_key, MonthTask};
use crate::store::errors::ErrorLedger;
use crate::store::links::LinkStore;
use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// The months currently being processed, for progress observability.
///
/// Written only on worker entry/exit; contention is bounded by the worker
/// count, so a single mutex is all that's warranted.
#[derive(Debug, Clone, Default)]
pub struct ActiveMonths {
    inner: Arc<Mutex<Vec<String>>>,
}

impl ActiveMonths {
    pub fn insert(&self, label: &str) {
        self.inner.lock().unwrap().push(label.to_string());
    }

    pub fn remove(&self, label: &str) {
        let mut active = self.inner.lock().unwrap();
        if let Some(position) = active.iter().position(|entry| entry == label) {
            active.remove(position);
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().unwrap().clone()
    }
}

/// Dispatches month workers over a date range with bounded parallelism.
///
/// The bound exists because the archive rate-limits informally; it is not a
/// local resource limit. Each worker owns its month exclusively; shared
/// state is the active-months set and the link store's append mutex.
#[derive(Debug)]
pub struct CrawlScheduler {
    client: PageClient,
    workers: usize,
    active: ActiveMonths,
}

impl CrawlScheduler {
    pub fn new(client: PageClient, workers: usize) -> Self {
        Self {
            client,
            workers: workers.max(1),
            active: ActiveMonths::default(),
        }
    }

    /// Collect links for every day in `[start, end]`. Returns the number of
    /// records discovered across all months; records are appended to the
    /// store incrementally as each month completes.
    pub async fn collect(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        store: &LinkStore,
        ledger: &ErrorLedger,
    ) -> Result<usize> {
        let tasks = partition_range(start, end)?;
        info!(%start, %end, months = tasks.len(), workers = self.workers, "Starting link collection");
        Ok(self.dispatch(tasks, store, ledger).await)
    }

    /// Replay failed units from the error ledger: for each (date, page)
    /// pair, re-run the remainder of that calendar month starting at the
    /// given listing page.
    pub async fn collect_resume(
        &self,
        points: Vec<(NaiveDate, u32)>,
        store: &LinkStore,
        ledger: &ErrorLedger,
    ) -> Result<usize> {
        let tasks = points
            .into_iter()
            .map(|(date, page)| {
                let mut task =
                    MonthTask::new(date.year(), date.month(), remaining_days_of_month(date));
                task.resume_page = page.max(1);
                task
            })
            .collect::<Vec<_>>();
        info!(months = tasks.len(), "Replaying failed units from error ledger");
        Ok(self.dispatch(tasks, store, ledger).await)
    }

    /// Run the workers, bounded, draining completions first-finished-first.
    /// A failed month is logged as fully failed; its sibling workers are
    /// unaffected and its per-day records already in the store stay valid.
    async fn dispatch(&self, tasks: Vec<MonthTask>, store: &LinkStore, ledger: &ErrorLedger) -> usize {
        let total = tasks.len();
        let mut completions = stream::iter(tasks)
            .map(|task| {
                let client = &self.client;
                let active = &self.active;
                async move {
                    let label = task.label();
                    let outcome = run_month(client, &task, store, ledger, active).await;
                    (label, outcome)
                }
            })
            .buffer_unordered(self.workers);

        let mut collected = 0usize;
        let mut completed = 0usize;
        let mut failed = 0usize;
        while let Some((label, outcome)) = completions.next().await {
            completed += 1;
            match outcome {
                Ok(records) => collected += records.len(),
                Err(e) => {
                    failed += 1;
                    error!(month = %label, error = %e, "Month worker failed");
                }
            }
            info!(
                completed,
                total,
                failed,
                active = ?self.active.snapshot(),
                "Month drained"
            );
        }
        collected
    }
}

/// Partition `[start, end]` into one task per calendar month, days
/// ascending within each month, months ascending overall. Every day of the
/// range lands in exactly one task.
pub fn partition_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<MonthTask>> {
    if start > end {
        return Err(HarvestError::InvalidRange { start, end });
    }
    let mut groups: BTreeMap<(i32, u32), Vec<NaiveDate>> = BTreeMap::new();
    for day in start.iter_days().take_while(|day| *day <= end) {
        groups.entry(month_key(day)).or_default().push(day);
    }
    Ok(groups
        .into_iter()
        .map(|((year, month), days)| MonthTask::new(year, month, days))
        .collect())
}

/// The days from `date` through the end of its calendar month, inclusive.
pub fn remaining_days_of_month(date: NaiveDate) -> Vec<NaiveDate> {
    date.iter_days()
        .take_while(|day| month_key(*day) == month_key(date))
        .collect()
}
