//! HTTP Analyzer Clients
//!
//! JSON-over-HTTP clients for the transcript and thumbnail analyzers.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::{
    AnalyzerError, AnalyzerOutcome, ThumbnailAnalyzer, ThumbnailAssessment, TranscriptAnalyzer,
    TranscriptAssessment,
};

/// Maps a collaborator's HTTP status to a failure kind.
fn classify_status(status: StatusCode, body: &str) -> AnalyzerError {
    let detail = if body.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body)
    };
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AnalyzerError::Validation(detail)
        }
        _ => AnalyzerError::Processing(detail),
    }
}

async fn post_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: Option<&str>,
    name: &str,
    body: serde_json::Value,
) -> AnalyzerOutcome<T> {
    let Some(endpoint) = endpoint else {
        return Err(AnalyzerError::Processing(format!(
            "{name} endpoint not configured"
        )));
    };

    debug!(endpoint, "Calling {name}");
    let response = client
        .post(endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|e| AnalyzerError::Processing(format!("{name} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "{name} returned an error");
        return Err(classify_status(status, text.trim()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AnalyzerError::Processing(format!("{name} returned an invalid body: {e}")))
}

// == Transcript Analyzer ==
/// Posts `{"video_url": ...}` and expects `{"is_safe", "reason"}`.
#[derive(Debug, Clone)]
pub struct HttpTranscriptAnalyzer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpTranscriptAnalyzer {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl TranscriptAnalyzer for HttpTranscriptAnalyzer {
    async fn analyze(&self, video_url: &str) -> AnalyzerOutcome<TranscriptAssessment> {
        post_json(
            &self.client,
            self.endpoint.as_deref(),
            "transcript analyzer",
            json!({ "video_url": video_url }),
        )
        .await
    }
}

// == Thumbnail Analyzer ==
/// Posts `{"image_url": ...}` and expects `{"allowed", "categories", "likelihood_scores"}`.
#[derive(Debug, Clone)]
pub struct HttpThumbnailAnalyzer {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpThumbnailAnalyzer {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ThumbnailAnalyzer for HttpThumbnailAnalyzer {
    async fn analyze(&self, image_url: &str) -> AnalyzerOutcome<ThumbnailAssessment> {
        post_json(
            &self.client,
            self.endpoint.as_deref(),
            "thumbnail analyzer",
            json!({ "image_url": image_url }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "bad id"),
            AnalyzerError::Validation(ref m) if m == "HTTP 400: bad id"
        ));
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            AnalyzerError::Validation(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, ""),
            AnalyzerError::Processing(ref m) if m == "HTTP 404"
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, ""),
            AnalyzerError::Processing(ref m) if m == "HTTP 502"
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_is_processing_failure() {
        let analyzer = HttpTranscriptAnalyzer::new(reqwest::Client::new(), None);
        let result = analyzer.analyze("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(AnalyzerError::Processing(_))));

        let analyzer = HttpThumbnailAnalyzer::new(reqwest::Client::new(), None);
        let result = analyzer.analyze("https://i.ytimg.com/vi/x/hqdefault.jpg").await;
        assert!(matches!(result, Err(AnalyzerError::Processing(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_processing_failure() {
        let analyzer = HttpTranscriptAnalyzer::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:1/analyze".to_string()),
        );
        let result = analyzer.analyze("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(AnalyzerError::Processing(_))));
    }
}
