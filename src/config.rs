//! Configuration structures and loading logic.
//!
//! Every field has a default, so the application runs without a config file.
//! CLI flags are merged over the file in [`crate::cli::Args::merge_into_config`].

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::Format;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

/// Mock content source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Tab shown first.
    pub format: Format,

    /// Cards per page.
    pub page_size: u32,

    /// Last page with content; later pages are empty.
    pub last_page: u32,

    /// Simulated response delay.
    pub latency_ms: u64,

    /// Give up on a page request after this long.
    pub timeout_ms: u64,

    /// Probability in `[0, 1]` that a page request fails.
    pub failure_rate: f64,

    /// Fixed RNG seed for reproducible content.
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            format: Format::default(),
            page_size: 10,
            last_page: 5,
            latency_ms: 1000,
            timeout_ms: 10_000,
            failure_rate: 0.0,
            seed: None,
        }
    }
}

/// Simulated media loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Probability in `[0, 1]` that a media URL fails to load.
    pub failure_rate: f64,

    pub latency_ms: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            latency_ms: 300,
        }
    }
}

/// Feed behaviour and UI timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Rows from the end of the list that count as "near the bottom".
    pub near_bottom_threshold: usize,

    /// How long refresh / failure notices stay visible.
    pub notice_ttl_ms: u64,

    /// UI loop tick.
    pub tick_rate_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            near_bottom_threshold: 3,
            notice_ttl_ms: 2000,
            tick_rate_ms: 100,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl FeedConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values the feed cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("source.failure_rate", self.source.failure_rate)?;
        check_probability("media.failure_rate", self.media.failure_rate)?;

        if self.source.page_size == 0 {
            return Err(ConfigError::invalid("source.page_size", "must be at least 1"));
        }
        if self.source.timeout_ms == 0 {
            return Err(ConfigError::invalid("source.timeout_ms", "must be at least 1"));
        }
        if self.feed.tick_rate_ms == 0 {
            return Err(ConfigError::invalid("feed.tick_rate_ms", "must be at least 1"));
        }

        Ok(())
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value} is not a probability between 0 and 1"),
        ));
    }
    Ok(())
}
