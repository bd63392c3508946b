//! Content Key Module
//!
//! Normalizes the many textual forms of a YouTube URL into the 11-character
//! video id that addresses cached verdicts.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Maximum accepted locator length in bytes
pub const MAX_LOCATOR_LENGTH: usize = 2048;

static YOUTUBE_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:(?:www|m|music)\.)?(?:youtube\.com|youtu\.be)(?:/|$)")
        .expect("valid host regex")
});

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?i:https?://)?(?i:(?:www|m|music)\.)?",
        r"(?:(?i:youtube\.com)/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/|live/|v/)|(?i:youtu\.be)/)",
        r"([0-9A-Za-z_-]{11})",
        r"(?:[?&#/].*)?$",
    ))
    .expect("valid video id regex")
});

// == Locator Error ==
/// Reasons a video locator is rejected before any work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("video_url cannot be empty")]
    Empty,

    #[error("video_url exceeds maximum length of {MAX_LOCATOR_LENGTH} characters")]
    TooLong,

    #[error("video_url must be a YouTube URL (youtube.com, youtu.be, youtube.com/shorts)")]
    NotYouTube,

    #[error("Invalid YouTube URL: Could not extract video ID")]
    NoVideoId,
}

// == Content Key ==
/// Stable cache key for one video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    /// Derives the key from a raw video locator.
    pub fn from_locator(locator: &str) -> Result<Self, LocatorError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(LocatorError::Empty);
        }
        if locator.len() > MAX_LOCATOR_LENGTH {
            return Err(LocatorError::TooLong);
        }
        if !YOUTUBE_HOST.is_match(locator) {
            return Err(LocatorError::NotYouTube);
        }

        VIDEO_ID
            .captures(locator)
            .and_then(|caps| caps.get(1))
            .map(|m| ContentKey(m.as_str().to_string()))
            .ok_or(LocatorError::NoVideoId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl ContentKey {
    pub(crate) fn for_test(id: &str) -> Self {
        ContentKey(id.to_string())
    }
}
