//! Runtime configuration with optional YAML override file.
//!
//! All fields have defaults tuned for the tagesschau archive, so the tool
//! runs without any config file. A YAML file passed via `--config` may
//! override any subset of fields.

use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Archive listing endpoint, queried with `datum` and `pageIndex`.
    pub archive_url: String,
    /// Origin that relative article links are resolved against.
    pub origin: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Bound on concurrently processed months in the crawl phase. The
    /// archive rate-limits informally; more workers produce errors, not
    /// throughput.
    pub month_workers: usize,
    /// Bound on simultaneously in-flight article fetches within a batch.
    pub fetch_concurrency: usize,
    /// Entries per fetch batch; one checkpoint artifact per batch.
    pub batch_size: usize,
    /// Pause between fetch batches, in seconds.
    pub cooldown_secs: u64,
    /// Attempts per article before an entry is declared a terminal failure.
    pub max_retries: u32,
    /// Backoff time unit in milliseconds. The wait after the n-th failed
    /// attempt is (10 + 2^n) units.
    pub backoff_unit_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            archive_url: "https://www.tagesschau.de/archiv".to_string(),
            origin: "https://www.tagesschau.de".to_string(),
            user_agent: concat!("tagesschau_archive/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            month_workers: 5,
            fetch_concurrency: 40,
            batch_size: 3000,
            cooldown_secs: 20,
            max_retries: 5,
            backoff_unit_ms: 1000,
        }
    }
}

impl HarvestConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }
}

/// Load the configuration, layering an optional YAML file over the defaults.
pub fn load_config(path: Option<&str>) -> Result<HarvestConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config: HarvestConfig = serde_yaml::from_str(&raw)
                .map_err(|e| HarvestError::Config(format!("{path}: {e}")))?;
            info!(path, "Loaded configuration");
            config
        }
        None => HarvestConfig::default(),
    };
    if config.month_workers == 0 || config.fetch_concurrency == 0 || config.batch_size == 0 {
        return Err(HarvestError::Config(
            "month_workers, fetch_concurrency and batch_size must be at least 1".to_string(),
        ));
    }
    Ok(config)
}
