//! Cache Record Module
//!
//! Backend-internal wrapper around a serialized verdict with its TTL.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Record ==
/// A serialized verdict plus its lifetime metadata.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    /// Content key the record is stored under
    pub key: String,
    /// Serialized VerdictEnvelope
    pub payload: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheRecord {
    // == Constructor ==
    /// Creates a record that expires `ttl` from now.
    pub fn new(key: impl Into<String>, payload: String, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        Self {
            key: key.into(),
            payload,
            created_at: now,
            expires_at: now.saturating_add(ttl.as_millis() as u64),
        }
    }

    // == Is Expired ==
    /// A record is logically absent once the current time is past `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    /// Remaining lifetime in seconds, 0 once expired.
    pub fn ttl_remaining(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms()) / 1000
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
