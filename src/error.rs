//! Error types for the discovery feed.

use std::time::Duration;

use thiserror::Error;

use crate::source::MediaKind;

/// A content source request that did not produce a page.
///
/// None of these are fatal: the feed leaves its state untouched, shows a
/// transient notice and releases the loading guard so the user can retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The fetch task ended without reporting a result (panic or shutdown).
    #[error("fetch abandoned before completion")]
    Abandoned,
}

/// A media URL that could not be displayed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("{kind} failed to load: {url}")]
    LoadFailed { kind: MediaKind, url: String },
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
