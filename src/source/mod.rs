//! Content source abstraction layer.
//!
//! This module defines the [`ContentSource`] trait, the [`Item`] card type and
//! the [`Format`] tag passed with every page request.  Concrete sources live
//! in sub-modules (currently only the randomized [`mock`] source).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `http.rs`).
//! 2. Define a struct and implement [`ContentSource`] for it.
//! 3. Add `mod http;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of the mock.
//!
//! The feed state machine, media tracking and UI are all source-agnostic.

mod item;
pub mod mock;

pub use item::{Dimensions, Item, Media, MediaKind};
pub use mock::MockSource;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// URL scheme tag sent with each page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Format {
    /// picsum.photos images.
    #[default]
    #[serde(rename = "format1")]
    #[value(name = "format1")]
    Picsum,
    /// source.unsplash.com images.
    #[serde(rename = "format2")]
    #[value(name = "format2")]
    Unsplash,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Picsum, Format::Unsplash];

    pub fn label(&self) -> &'static str {
        match self {
            Format::Picsum => "Picsum",
            Format::Unsplash => "Unsplash",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Picsum => write!(f, "format1"),
            Format::Unsplash => write!(f, "format2"),
        }
    }
}

/// Trait that every content source must implement.
///
/// Pages are numbered from 1.  An empty page means the stream is exhausted.
/// Sources are not required to be repeatable: asking twice for the same
/// `(page, format)` may return different items.
///
/// Fetches run on the tokio runtime while the UI thread keeps going, so
/// implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// Fetch one page of items.
    async fn fetch_page(&self, page: u32, format: Format) -> Result<Vec<Item>, FetchError>;
}
