//! Randomized mock content source.
//!
//! Generates pages of image and video cards with a simulated network delay.
//! Roughly three in ten cards are videos, sizes are random, and every page
//! past `last_page` is empty so the feed eventually runs dry.
//!
//! Nothing here is repeatable unless a seed is configured: asking twice for
//! the same page yields different media kinds and dimensions.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ContentSource, Dimensions, Format, Item, Media};
use crate::config::SourceConfig;
use crate::error::FetchError;

const SAMPLE_VIDEOS: [&str; 4] = [
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4",
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4",
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4",
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4",
];

const TITLES: [&str; 10] = [
    "Discover the good life",
    "Happy moments",
    "Community picks",
    "Trending today",
    "Player favourites",
    "Highlights",
    "Hot topics",
    "Editor's choice",
    "Daily discovery",
    "Fun finds",
];

/// Probability that a generated card is a video.
const VIDEO_RATIO: f64 = 0.3;

pub struct MockSource {
    page_size: u32,
    last_page: u32,
    latency: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl MockSource {
    pub fn new(config: &SourceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            page_size: config.page_size,
            last_page: config.last_page,
            latency: Duration::from_millis(config.latency_ms),
            failure_rate: config.failure_rate,
            rng: Mutex::new(rng),
        }
    }

    /// Build one page of cards.  Pure apart from the RNG, so tests can call it
    /// without waiting on the simulated latency.
    pub fn generate_page(&self, page: u32, format: Format) -> Vec<Item> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let start = u64::from(page.saturating_sub(1)) * u64::from(self.page_size);

        (0..u64::from(self.page_size))
            .map(|offset| {
                let n = start + offset;
                let id = n.to_string();
                let is_video = rng.gen_bool(VIDEO_RATIO);
                let dimensions = Dimensions {
                    width: rng.gen_range(200..400),
                    height: rng.gen_range(200..400),
                };

                let media = if is_video {
                    Media::Video {
                        url: SAMPLE_VIDEOS[(n % SAMPLE_VIDEOS.len() as u64) as usize].to_string(),
                    }
                } else {
                    Media::Image {
                        url: image_url(format, &id),
                    }
                };

                Item {
                    title: format!(
                        "{} #{} - {}",
                        TITLES[(n % TITLES.len() as u64) as usize],
                        id,
                        media.kind()
                    ),
                    description: format!("Details for card {id} (page {page})"),
                    thumbnail_url: thumbnail_url(format, &id),
                    id,
                    media,
                    dimensions,
                }
            })
            .collect()
    }

    fn roll_failure(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_bool(self.failure_rate)
    }
}

fn image_url(format: Format, id: &str) -> String {
    match format {
        Format::Picsum => format!("https://picsum.photos/400/300?random={id}"),
        Format::Unsplash => format!("https://source.unsplash.com/random/400x300?sig={id}"),
    }
}

fn thumbnail_url(format: Format, id: &str) -> String {
    match format {
        Format::Picsum => format!("https://picsum.photos/200/200?random={id}"),
        Format::Unsplash => format!("https://source.unsplash.com/random/200x200?sig={id}"),
    }
}

#[async_trait]
impl ContentSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, page: u32, format: Format) -> Result<Vec<Item>, FetchError> {
        if page == 0 {
            return Err(FetchError::Unavailable("page numbers start at 1".into()));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.roll_failure() {
            tracing::debug!(page, %format, "mock source simulating a failure");
            return Err(FetchError::Unavailable("simulated network failure".into()));
        }

        if page > self.last_page {
            tracing::debug!(page, last_page = self.last_page, "mock source exhausted");
            return Ok(Vec::new());
        }

        Ok(self.generate_page(page, format))
    }
}
