//! Collaborators Module
//!
//! Narrow interfaces to the external services a verdict depends on: the
//! transcript-safety analyzer, the thumbnail-safety analyzer and the video
//! metadata resolver.

mod http;
mod youtube;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::verdict::ContentKey;

pub use http::{HttpThumbnailAnalyzer, HttpTranscriptAnalyzer};
pub use youtube::{thumbnail_url, YouTubeResolver};

// == Analyzer Error ==
/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The collaborator rejected the input itself
    #[error("{0}")]
    Validation(String),

    /// Network, timeout or internal failure in the collaborator
    #[error("{0}")]
    Processing(String),
}

/// Tagged result of one collaborator call.
pub type AnalyzerOutcome<T> = Result<T, AnalyzerError>;

// == Collaborator Payloads ==
/// Transcript-safety judgment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptAssessment {
    pub is_safe: bool,
    #[serde(default)]
    pub reason: String,
}

/// Thumbnail-safety judgment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThumbnailAssessment {
    pub allowed: bool,
    /// Category name to flagged
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Category name to likelihood label
    #[serde(default)]
    pub likelihood_scores: BTreeMap<String, String>,
}

impl ThumbnailAssessment {
    /// Flagged category names in sorted order.
    pub fn flagged(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Human-readable explanation of the judgment.
    pub fn reason(&self) -> String {
        if self.allowed {
            return "Thumbnail is safe. No inappropriate content detected.".to_string();
        }
        let flagged = self.flagged();
        if flagged.is_empty() {
            "Thumbnail flagged as UNSAFE.".to_string()
        } else {
            format!("Thumbnail flagged as UNSAFE. Detected: {}.", flagged.join(", "))
        }
    }
}

/// Resolved video metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub thumbnail_url: String,
    pub title: String,
    pub channel: String,
}

// == Collaborator Traits ==
#[async_trait]
pub trait TranscriptAnalyzer: Send + Sync {
    /// Judges the spoken content of the video at `video_url`.
    async fn analyze(&self, video_url: &str) -> AnalyzerOutcome<TranscriptAssessment>;
}

#[async_trait]
pub trait ThumbnailAnalyzer: Send + Sync {
    /// Judges the image at `image_url`.
    async fn analyze(&self, image_url: &str) -> AnalyzerOutcome<ThumbnailAssessment>;
}

#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Looks up title, channel and thumbnail for a video.
    async fn resolve(&self, video: &ContentKey) -> AnalyzerOutcome<VideoMetadata>;
}
