//! Verdict Envelope Module
//!
//! The canonical verdict record: cached, returned to clients, and served
//! back verbatim on a cache hit.

use serde::{Deserialize, Serialize};

// == Overall Reasons ==
pub const REASON_BOTH_SAFE: &str = "SAFE: both transcript and thumbnail are appropriate.";
pub const REASON_BOTH_UNSAFE: &str =
    "UNSAFE: both transcript and thumbnail contain inappropriate content.";
pub const REASON_TRANSCRIPT_UNSAFE: &str =
    "UNSAFE: transcript contains inappropriate content despite safe thumbnail.";
pub const REASON_THUMBNAIL_UNSAFE: &str =
    "UNSAFE: thumbnail contains inappropriate imagery despite safe transcript.";

/// Picks the overall explanation for a pair of sub-verdicts.
///
/// First match wins: both safe, both unsafe, transcript unsafe, thumbnail unsafe.
pub fn overall_reason(transcript_safe: bool, thumbnail_safe: bool) -> &'static str {
    match (transcript_safe, thumbnail_safe) {
        (true, true) => REASON_BOTH_SAFE,
        (false, false) => REASON_BOTH_UNSAFE,
        (false, true) => REASON_TRANSCRIPT_UNSAFE,
        (true, false) => REASON_THUMBNAIL_UNSAFE,
    }
}

// == Sub-verdicts ==
/// Result of the transcript branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptVerdict {
    pub is_safe: bool,
    pub reason: String,
}

/// Result of the thumbnail branch, including the resolved video metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailVerdict {
    pub is_safe: bool,
    pub reason: String,
    pub video_title: String,
    pub channel_title: String,
}

// == Verdict Envelope ==
/// Combined child-safety verdict for one video.
///
/// Only [`VerdictEnvelope::combine`] builds new envelopes, so `is_safe` and
/// `overall_reason` always follow from the two sub-verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictEnvelope {
    is_safe_transcript: bool,
    is_safe_thumbnail: bool,
    is_safe: bool,
    transcript_reason: String,
    thumbnail_reason: String,
    overall_reason: String,
    video_title: String,
    channel_title: String,
}

impl VerdictEnvelope {
    /// Merges both sub-verdicts into one envelope.
    pub fn combine(transcript: TranscriptVerdict, thumbnail: ThumbnailVerdict) -> Self {
        Self {
            is_safe_transcript: transcript.is_safe,
            is_safe_thumbnail: thumbnail.is_safe,
            is_safe: transcript.is_safe && thumbnail.is_safe,
            transcript_reason: transcript.reason,
            thumbnail_reason: thumbnail.reason,
            overall_reason: overall_reason(transcript.is_safe, thumbnail.is_safe).to_string(),
            video_title: thumbnail.video_title,
            channel_title: thumbnail.channel_title,
        }
    }

    /// Checks the derived fields of an envelope read back from storage.
    pub fn is_consistent(&self) -> bool {
        self.is_safe == (self.is_safe_transcript && self.is_safe_thumbnail)
            && self.overall_reason == overall_reason(self.is_safe_transcript, self.is_safe_thumbnail)
    }

    pub fn is_safe(&self) -> bool {
        self.is_safe
    }

    pub fn is_safe_transcript(&self) -> bool {
        self.is_safe_transcript
    }

    pub fn is_safe_thumbnail(&self) -> bool {
        self.is_safe_thumbnail
    }

    pub fn transcript_reason(&self) -> &str {
        &self.transcript_reason
    }

    pub fn thumbnail_reason(&self) -> &str {
        &self.thumbnail_reason
    }

    pub fn overall_reason(&self) -> &str {
        &self.overall_reason
    }

    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    pub fn channel_title(&self) -> &str {
        &self.channel_title
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(transcript_safe: bool, thumbnail_safe: bool) -> VerdictEnvelope {
        VerdictEnvelope::combine(
            TranscriptVerdict {
                is_safe: transcript_safe,
                reason: "transcript reason".to_string(),
            },
            ThumbnailVerdict {
                is_safe: thumbnail_safe,
                reason: "thumbnail reason".to_string(),
                video_title: "Title".to_string(),
                channel_title: "Channel".to_string(),
            },
        )
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            (true, true, true, REASON_BOTH_SAFE),
            (false, false, false, REASON_BOTH_UNSAFE),
            (false, true, false, REASON_TRANSCRIPT_UNSAFE),
            (true, false, false, REASON_THUMBNAIL_UNSAFE),
        ];

        for (transcript, thumbnail, expected_safe, expected_reason) in cases {
            let env = envelope(transcript, thumbnail);
            assert_eq!(env.is_safe(), expected_safe);
            assert_eq!(env.overall_reason(), expected_reason);
            assert!(env.is_consistent());
        }
    }

    #[test]
    fn test_fields_carried_over() {
        let env = envelope(true, false);
        assert!(env.is_safe_transcript());
        assert!(!env.is_safe_thumbnail());
        assert_eq!(env.transcript_reason(), "transcript reason");
        assert_eq!(env.thumbnail_reason(), "thumbnail reason");
        assert_eq!(env.video_title(), "Title");
        assert_eq!(env.channel_title(), "Channel");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(envelope(true, true)).unwrap();
        for field in [
            "is_safe_transcript",
            "is_safe_thumbnail",
            "is_safe",
            "transcript_reason",
            "thumbnail_reason",
            "overall_reason",
            "video_title",
            "channel_title",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_tampered_envelope_is_inconsistent() {
        let mut json = serde_json::to_value(envelope(false, true)).unwrap();
        json["is_safe"] = serde_json::Value::Bool(true);
        let env: VerdictEnvelope = serde_json::from_value(json).unwrap();
        assert!(!env.is_consistent());
    }
}
