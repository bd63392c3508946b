//! YouTube Metadata Resolver
//!
//! Resolves title, channel and best thumbnail through the YouTube Data API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{AnalyzerError, AnalyzerOutcome, MetadataResolver, VideoMetadata};
use crate::verdict::ContentKey;

/// Thumbnail URL for a video at the given quality
/// (`maxresdefault`, `hqdefault`, `mqdefault`, `default`).
pub fn thumbnail_url(video: &ContentKey, quality: &str) -> String {
    format!("https://i.ytimg.com/vi/{video}/{quality}.jpg")
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
}

// == YouTube Resolver ==
#[derive(Debug, Clone)]
pub struct YouTubeResolver {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeResolver {
    pub fn new(client: reqwest::Client, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_snippet(&self, video: &ContentKey) -> AnalyzerOutcome<Snippet> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AnalyzerError::Validation(
                "YouTube API key not configured".to_string(),
            ));
        };

        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "snippet"), ("id", video.as_str()), ("key", api_key)])
            .send()
            .await
            .map_err(|e| AnalyzerError::Processing(format!("YouTube API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Processing(format!(
                "YouTube API error: {}",
                status.as_u16()
            )));
        }

        let list: VideoListResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Processing(format!("YouTube API invalid body: {e}")))?;

        list.items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| AnalyzerError::Validation(format!("Video not found: {video}")))
    }

    /// Prefers `maxresdefault`, which not every video has; falls back to `hqdefault`.
    async fn best_thumbnail(&self, video: &ContentKey) -> String {
        let maxres = thumbnail_url(video, "maxresdefault");
        match self.client.head(&maxres).send().await {
            Ok(resp) if resp.status().is_success() => return maxres,
            Ok(resp) => debug!(status = resp.status().as_u16(), "maxresdefault not available"),
            Err(e) => debug!(error = %e, "maxresdefault probe failed"),
        }
        thumbnail_url(video, "hqdefault")
    }
}

#[async_trait]
impl MetadataResolver for YouTubeResolver {
    async fn resolve(&self, video: &ContentKey) -> AnalyzerOutcome<VideoMetadata> {
        let snippet = self.fetch_snippet(video).await?;
        let thumbnail_url = self.best_thumbnail(video).await;

        let metadata = VideoMetadata {
            thumbnail_url,
            title: snippet.title.unwrap_or_else(|| "Unknown".to_string()),
            channel: snippet.channel_title.unwrap_or_else(|| "Unknown".to_string()),
        };
        info!(
            %video,
            title = %metadata.title,
            channel = %metadata.channel,
            "Resolved video metadata"
        );
        Ok(metadata)
    }
}
