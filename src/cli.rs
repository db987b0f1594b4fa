//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::source::Format;

/// Infinite-scroll discovery feed in the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "discovery-feed",
    version,
    about = "Browse an infinite-scroll feed of image and video cards",
    long_about = "A terminal discovery feed backed by a mock content source.\n\n\
                  Scroll to load more, press r to refresh, and scroll back to the top \
                  after a refresh to get the previous feed back."
)]
pub struct Args {
    /// Path to an optional configuration file.
    #[arg(short, long, env = "DISCOVERY_FEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tab shown at startup.
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Seed the mock source for reproducible content.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Last page with content; later pages come back empty.
    #[arg(long)]
    pub last_page: Option<u32>,

    /// Simulated source latency in milliseconds.
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Write logs to this file (the terminal is taken by the UI).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments over a loaded configuration.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.source.format = format;
        }

        if let Some(seed) = self.seed {
            config.source.seed = Some(seed);
        }

        if let Some(last_page) = self.last_page {
            config.source.last_page = last_page;
        }

        if let Some(latency) = self.latency_ms {
            config.source.latency_ms = latency;
        }
    }
}
