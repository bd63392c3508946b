//! Cache Module
//!
//! Verdict cache with two interchangeable backends: Redis (persistent,
//! shared) and a process-local in-memory fallback.

mod memory;
mod persistent;
mod record;
mod selector;
mod stats;


use std::time::Duration;

use async_trait::async_trait;

use crate::verdict::{ContentKey, VerdictEnvelope};

// Re-export public types
pub use memory::MemoryCache;
pub use persistent::{mask_url, RedisCache, STATS_KEY, VERDICT_KEY_PREFIX};
pub use record::CacheRecord;
pub use selector::{select_backend, CacheSelector, CacheSettings};
pub use stats::CacheStats;

// == Public Constants ==
/// Default verdict TTL (7 days)
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// == Write Outcome ==
/// Result of a best-effort cache write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The verdict was stored
    Stored,
    /// The write failed; the failure was logged and the request continues
    SoftFailure(String),
}

impl WriteOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, WriteOutcome::Stored)
    }
}

// == Backend Kind ==
/// Which backend is serving the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Persistent,
    InMemory,
}

impl BackendKind {
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Persistent => "Redis (Persistent)",
            BackendKind::InMemory => "In-Memory (Non-Persistent)",
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BackendKind::Persistent)
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, BackendKind::Persistent)
    }
}

// == Cache Backend ==
/// Contract shared by every verdict cache backend.
///
/// Backend failures never reach the caller: reads degrade to a miss and
/// writes degrade to [`WriteOutcome::SoftFailure`].
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Looks up a verdict. Counts a hit or a miss.
    async fn get(&self, key: &ContentKey) -> Option<VerdictEnvelope>;

    /// Stores a verdict for `ttl`. Counts a set on success.
    async fn set_with_ttl(
        &self,
        key: &ContentKey,
        envelope: &VerdictEnvelope,
        ttl: Duration,
    ) -> WriteOutcome;

    /// Removes every verdict record and returns how many were removed.
    async fn clear(&self) -> usize;

    /// Snapshot of the backend's counters.
    async fn stats(&self) -> CacheStats;

    fn kind(&self) -> BackendKind;

    fn default_ttl(&self) -> Duration;

    /// Stores a verdict with the backend's default TTL.
    async fn set(&self, key: &ContentKey, envelope: &VerdictEnvelope) -> WriteOutcome {
        self.set_with_ttl(key, envelope, self.default_ttl()).await
    }

    /// Physically drops expired records. Backends with native expiry return 0.
    async fn purge_expired(&self) -> usize {
        0
    }
}

// == Verdict Cache ==
/// The backend chosen for this process.
pub enum VerdictCache {
    Persistent(RedisCache),
    InMemory(MemoryCache),
}

#[async_trait]
impl CacheBackend for VerdictCache {
    async fn get(&self, key: &ContentKey) -> Option<VerdictEnvelope> {
        match self {
            VerdictCache::Persistent(c) => c.get(key).await,
            VerdictCache::InMemory(c) => c.get(key).await,
        }
    }

    async fn set_with_ttl(
        &self,
        key: &ContentKey,
        envelope: &VerdictEnvelope,
        ttl: Duration,
    ) -> WriteOutcome {
        match self {
            VerdictCache::Persistent(c) => c.set_with_ttl(key, envelope, ttl).await,
            VerdictCache::InMemory(c) => c.set_with_ttl(key, envelope, ttl).await,
        }
    }

    async fn clear(&self) -> usize {
        match self {
            VerdictCache::Persistent(c) => c.clear().await,
            VerdictCache::InMemory(c) => c.clear().await,
        }
    }

    async fn stats(&self) -> CacheStats {
        match self {
            VerdictCache::Persistent(c) => c.stats().await,
            VerdictCache::InMemory(c) => c.stats().await,
        }
    }

    fn kind(&self) -> BackendKind {
        match self {
            VerdictCache::Persistent(c) => c.kind(),
            VerdictCache::InMemory(c) => c.kind(),
        }
    }

    fn default_ttl(&self) -> Duration {
        match self {
            VerdictCache::Persistent(c) => c.default_ttl(),
            VerdictCache::InMemory(c) => c.default_ttl(),
        }
    }

    async fn purge_expired(&self) -> usize {
        match self {
            VerdictCache::Persistent(c) => c.purge_expired().await,
            VerdictCache::InMemory(c) => c.purge_expired().await,
        }
    }
}
