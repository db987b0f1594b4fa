//! Full-screen video overlay.

/// At most one video plays at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VideoOverlay {
    #[default]
    Closed,
    Playing(String),
}

impl VideoOverlay {
    /// Start playing `url`, replacing whatever was playing.
    pub fn activate(&mut self, url: impl Into<String>) {
        *self = VideoOverlay::Playing(url.into());
    }

    /// Close the overlay.  Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        match std::mem::take(self) {
            VideoOverlay::Playing(url) => {
                tracing::debug!(%url, "video overlay closed");
                true
            }
            VideoOverlay::Closed => false,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, VideoOverlay::Playing(_))
    }

    pub fn playing(&self) -> Option<&str> {
        match self {
            VideoOverlay::Playing(url) => Some(url),
            VideoOverlay::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_activation_wins() {
        let mut overlay = VideoOverlay::default();
        overlay.activate("a");
        overlay.activate("b");
        assert_eq!(overlay, VideoOverlay::Playing("b".into()));
    }

    #[test]
    fn close_from_playing() {
        let mut overlay = VideoOverlay::Playing("a".into());
        assert!(overlay.close());
        assert_eq!(overlay, VideoOverlay::Closed);
        assert!(overlay.playing().is_none());
    }

    #[test]
    fn close_when_closed_is_noop() {
        let mut overlay = VideoOverlay::Closed;
        assert!(!overlay.close());
        assert!(!overlay.is_open());
    }
}
