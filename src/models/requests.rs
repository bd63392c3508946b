//! Request DTOs for the verdict API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /api/happyScroll/v1/verdict
///
/// A missing `video_url` deserializes as empty so it is reported with the
/// same message as an empty one.
#[derive(Debug, Clone, Deserialize)]
pub struct VerdictRequest {
    /// YouTube video URL to analyze
    #[serde(default)]
    pub video_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_request_deserialize() {
        let json = r#"{"video_url": "https://youtu.be/dQw4w9WgXcQ"}"#;
        let req: VerdictRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.video_url, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_missing_field_is_empty() {
        let req: VerdictRequest = serde_json::from_str("{}").unwrap();
        assert!(req.video_url.is_empty());
    }
}
