//! Command-line interface definitions.
//!
//! Three subcommands map onto the pipeline's restartable operations:
//! `collect` walks a date range, `collect-after` replays failed units from
//! the error ledger, and `fetch` resolves all pending links into articles.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Command-line arguments for the archive harvester.
///
/// # Examples
///
/// ```sh
/// # Collect teaser links for a range
/// tagesschau_archive collect --start-date 2024-01-01 --end-date 2024-03-31
///
/// # Replay the units that failed during collection
/// tagesschau_archive collect-after
///
/// # Fetch full articles for everything still pending
/// tagesschau_archive fetch --output-dir ./articles
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional YAML config file overriding the built-in defaults
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the archive for a date range and append discovered links to the link log
    Collect {
        /// First day of the range, YYYY-MM-DD
        #[arg(long, default_value = "2023-10-01")]
        start_date: NaiveDate,

        /// Last day of the range, YYYY-MM-DD; today when omitted
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Path of the newline-delimited link log
        #[arg(long, default_value = "links.jsonl")]
        links_file: String,

        /// Path of the error ledger
        #[arg(long, default_value = "error_days.json")]
        error_file: String,
    },

    /// Replay exactly the failed (date, page) units recorded in the error ledger
    CollectAfter {
        /// Path of the newline-delimited link log
        #[arg(long, default_value = "links.jsonl")]
        links_file: String,

        /// Path of the error ledger
        #[arg(long, default_value = "error_days.json")]
        error_file: String,
    },

    /// Fetch full articles for all pending entries in the link log
    Fetch {
        /// Path of the newline-delimited link log
        #[arg(long, default_value = "links.jsonl")]
        links_file: String,

        /// Directory for batch checkpoints and the combined output
        #[arg(short, long, default_value = "articles")]
        output_dir: String,

        /// Max simultaneous in-flight requests; config value when omitted
        #[arg(long)]
        concurrency: Option<usize>,
    },
}
