//! # tagesschau_archive
//!
//! Harvests the tagesschau.de news archive in two independently
//! restartable phases:
//!
//! 1. **Collect**: walk a date range over the date-indexed archive listing,
//!    discover article teasers, and append them to an append-only link log.
//!    Months run in parallel on a small bounded pool; a month stops early
//!    once the archive collapses its remaining days into a monthly summary
//!    page. Failed listing pages land in an error ledger for replay.
//! 2. **Fetch**: resolve every pending link into a full article with
//!    bounded concurrency and exponential-backoff retries, batching the
//!    backlog and checkpointing after every batch so a crash never loses
//!    completed work.
//!
//! ## Usage
//!
//! ```sh
//! tagesschau_archive collect --start-date 2024-01-01 --end-date 2024-06-30
//! tagesschau_archive fetch --output-dir ./articles
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod models;
pub mod parsers;
pub mod store;
pub mod utils;

pub use client::PageClient;
pub use config::HarvestConfig;
pub use crawl::scheduler::CrawlScheduler;
pub use error::{HarvestError, Result};
pub use fetch::orchestrator::BatchFetchOrchestrator;
pub use models::{ArticleRecord, ErrorRecord, FetchOutcome, LinkRecord, MonthTask};
pub use store::errors::ErrorLedger;
pub use store::links::LinkStore;
