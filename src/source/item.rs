//! The item type shared by every content source.
//!
//! `Item` is one card in the discovery feed.  Every source implementation
//! builds `Item`s so the feed and the UI stay source-agnostic.
//!
//! ## For contributors
//!
//! The media kind and its primary URL are a single [`Media`] value, so an
//! item can never claim to be a video while pointing at an image URL.

use std::fmt;

/// Which kind of media a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// The primary media of an item, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Image { url: String },
    Video { url: String },
}

impl Media {
    pub fn kind(&self) -> MediaKind {
        match self {
            Media::Image { .. } => MediaKind::Image,
            Media::Video { .. } => MediaKind::Video,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Media::Image { url } | Media::Video { url } => url,
        }
    }
}

/// Advisory layout size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// A single feed card as returned by a content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Source identifier.
    ///
    /// Only unique within one fetched page.  The feed stamps its own
    /// session-unique key on top (see [`crate::feed::EntryKey`]).
    pub id: String,

    /// Image or video, with its URL.
    pub media: Media,

    /// Still image shown before and around video playback.
    pub thumbnail_url: String,

    /// Card headline.
    pub title: String,

    /// Short body text under the title.
    pub description: String,

    pub dimensions: Dimensions,
}

impl Item {
    pub fn kind(&self) -> MediaKind {
        self.media.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_matches_variant() {
        let image = Media::Image { url: "https://img".into() };
        let video = Media::Video { url: "https://vid".into() };

        assert_eq!(image.kind(), MediaKind::Image);
        assert_eq!(video.kind(), MediaKind::Video);
        assert_eq!(video.url(), "https://vid");
    }

    #[test]
    fn display_formats() {
        assert_eq!(MediaKind::Video.to_string(), "video");
        let dims = Dimensions { width: 320, height: 240 };
        assert_eq!(dims.to_string(), "320×240");
    }
}
