//! Verdict Module
//!
//! Content keys, the verdict envelope, the daily rate gate and the
//! fan-out/combine service that ties them to the cache and collaborators.

mod content_key;
mod envelope;
mod rate_gate;
mod service;

pub use content_key::{ContentKey, LocatorError, MAX_LOCATOR_LENGTH};
pub use envelope::{
    overall_reason, ThumbnailVerdict, TranscriptVerdict, VerdictEnvelope, REASON_BOTH_SAFE,
    REASON_BOTH_UNSAFE, REASON_THUMBNAIL_UNSAFE, REASON_TRANSCRIPT_UNSAFE,
};
pub use rate_gate::{Clock, QuotaExceeded, QuotaStatus, RateGate, SystemClock};
pub use service::{VerdictError, VerdictOutcome, VerdictService, VerdictSource};
