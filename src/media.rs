//! Media health tracking and simulated media loading.
//!
//! [`MediaHealth`] remembers every image and video URL that failed to load.
//! It is insert-only: once a URL has failed it is shown as a placeholder for
//! the rest of the session, refreshes included.
//!
//! [`MediaProbe`] stands in for the browser-side "load this image" step.  The
//! UI probes each URL once; a failed probe is reported back as a
//! `MediaLoadFailed` event which lands in [`MediaHealth::mark_failed`].

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MediaConfig;
use crate::error::MediaError;
use crate::source::MediaKind;

/// Failed media URLs, one set per kind.
#[derive(Debug, Default)]
pub struct MediaHealth {
    failed_images: HashSet<String>,
    failed_videos: HashSet<String>,
}

impl MediaHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.  Returns `true` if the URL was not already known.
    pub fn mark_failed(&mut self, kind: MediaKind, url: &str) -> bool {
        let inserted = self.set_mut(kind).insert(url.to_string());
        if inserted {
            tracing::debug!(%kind, url, "media marked as failed");
        }
        inserted
    }

    pub fn has_failed(&self, kind: MediaKind, url: &str) -> bool {
        self.set(kind).contains(url)
    }

    pub fn failed_count(&self, kind: MediaKind) -> usize {
        self.set(kind).len()
    }

    fn set(&self, kind: MediaKind) -> &HashSet<String> {
        match kind {
            MediaKind::Image => &self.failed_images,
            MediaKind::Video => &self.failed_videos,
        }
    }

    fn set_mut(&mut self, kind: MediaKind) -> &mut HashSet<String> {
        match kind {
            MediaKind::Image => &mut self.failed_images,
            MediaKind::Video => &mut self.failed_videos,
        }
    }
}

/// Something that can attempt to load a media URL.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, kind: MediaKind, url: &str) -> Result<(), MediaError>;
}

/// Probe that fails at random with a fixed probability.
pub struct MockProbe {
    failure_rate: f64,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl MockProbe {
    pub fn new(config: &MediaConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            failure_rate: config.failure_rate,
            latency: Duration::from_millis(config.latency_ms),
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl MediaProbe for MockProbe {
    async fn probe(&self, kind: MediaKind, url: &str) -> Result<(), MediaError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let failed = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.failure_rate > 0.0 && rng.gen_bool(self.failure_rate)
        };

        if failed {
            Err(MediaError::LoadFailed {
                kind,
                url: url.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_then_query() {
        let mut health = MediaHealth::new();
        assert!(!health.has_failed(MediaKind::Image, "a"));

        assert!(health.mark_failed(MediaKind::Image, "a"));
        assert!(health.has_failed(MediaKind::Image, "a"));
    }

    #[test]
    fn mark_is_idempotent() {
        let mut health = MediaHealth::new();
        assert!(health.mark_failed(MediaKind::Video, "v"));
        assert!(!health.mark_failed(MediaKind::Video, "v"));
        assert_eq!(health.failed_count(MediaKind::Video), 1);
    }

    #[test]
    fn kinds_are_tracked_separately() {
        let mut health = MediaHealth::new();
        health.mark_failed(MediaKind::Video, "same-url");

        assert!(health.has_failed(MediaKind::Video, "same-url"));
        assert!(!health.has_failed(MediaKind::Image, "same-url"));
        assert_eq!(health.failed_count(MediaKind::Image), 0);
    }

    #[tokio::test]
    async fn mock_probe_respects_rate_extremes() {
        let always = MockProbe::new(
            &MediaConfig {
                failure_rate: 1.0,
                latency_ms: 0,
            },
            Some(1),
        );
        let never = MockProbe::new(
            &MediaConfig {
                failure_rate: 0.0,
                latency_ms: 0,
            },
            Some(1),
        );

        let err = always.probe(MediaKind::Image, "u").await.unwrap_err();
        assert_eq!(
            err,
            MediaError::LoadFailed {
                kind: MediaKind::Image,
                url: "u".into()
            }
        );
        assert!(never.probe(MediaKind::Video, "u").await.is_ok());
    }
}
