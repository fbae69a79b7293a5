use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use tagesschau_archive::cli::{Cli, Command};
use tagesschau_archive::store::checkpoint;
use tagesschau_archive::utils::ensure_writable_dir;
use tagesschau_archive::{
    config, BatchFetchOrchestrator, CrawlScheduler, ErrorLedger, LinkStore, PageClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tagesschau_archive starting up");

    let args = Cli::parse();
    let config = config::load_config(args.config.as_deref())?;

    match args.command {
        Command::Collect {
            start_date,
            end_date,
            links_file,
            error_file,
        } => {
            let end_date = end_date.unwrap_or_else(|| Local::now().date_naive());
            let client = PageClient::new(&config)?;
            let scheduler = CrawlScheduler::new(client, config.month_workers);
            let store = LinkStore::new(&links_file);
            let ledger = ErrorLedger::new(&error_file);

            let count = scheduler
                .collect(start_date, end_date, &store, &ledger)
                .await?;
            info!(count, %links_file, "Link collection finished");
        }

        Command::CollectAfter {
            links_file,
            error_file,
        } => {
            let ledger = ErrorLedger::new(&error_file);
            let points = ledger.resume_points().await?;
            if points.is_empty() {
                info!("Error ledger is empty; nothing to replay");
            } else {
                let client = PageClient::new(&config)?;
                let scheduler = CrawlScheduler::new(client, config.month_workers);
                let store = LinkStore::new(&links_file);

                let count = scheduler.collect_resume(points, &store, &ledger).await?;
                info!(count, %links_file, "Replay finished");
            }
        }

        Command::Fetch {
            links_file,
            output_dir,
            concurrency,
        } => {
            // fail on a bad output path before any network work
            ensure_writable_dir(&output_dir).await?;

            let store = LinkStore::new(&links_file);
            let entries = store.load_pending().await?;
            if entries.is_empty() {
                info!(%links_file, "No pending links; nothing to fetch");
            } else {
                let concurrency = concurrency.unwrap_or(config.fetch_concurrency);
                let orchestrator = BatchFetchOrchestrator::new(config.clone(), &output_dir);
                let articles = orchestrator.fetch_all(&entries, concurrency).await?;
                checkpoint::write_final(Path::new(&output_dir), &articles).await?;
                info!(
                    resolved = articles.len(),
                    dropped = entries.len() - articles.len(),
                    %output_dir,
                    "Articles written"
                );
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
