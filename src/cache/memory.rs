//! In-Memory Cache Module
//!
//! Process-local verdict cache used when no persistent store is available.
//! Records are checked for expiry on every read; a background task purges
//! them physically.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{BackendKind, CacheBackend, CacheRecord, CacheStats, WriteOutcome};
use crate::verdict::{ContentKey, VerdictEnvelope};

// == Memory Store ==
/// Record map plus counters, guarded as one unit.
#[derive(Debug, Default)]
struct MemoryStore {
    records: HashMap<String, CacheRecord>,
    stats: CacheStats,
}

impl MemoryStore {
    /// Returns the payload of a live record. Absent and expired records count as a miss.
    fn lookup(&mut self, key: &str) -> Option<String> {
        let Some(record) = self.records.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if record.is_expired() {
            self.records.remove(key);
            self.stats.record_miss();
            self.stats.set_entries_count(self.live_count());
            debug!(key, "Memory cache EXPIRED");
            return None;
        }

        Some(record.payload.clone())
    }

    fn insert(&mut self, record: CacheRecord) {
        self.records.insert(record.key.clone(), record);
        self.stats.record_set();
        self.stats.set_entries_count(self.live_count());
    }

    /// Drops a record that turned out to be unreadable, counting the lookup as a miss.
    fn discard_corrupt(&mut self, key: &str) {
        self.records.remove(key);
        self.stats.record_miss();
        self.stats.set_entries_count(self.live_count());
    }

    /// Records not yet past their expiry.
    fn live_count(&self) -> usize {
        self.records.values().filter(|r| !r.is_expired()).count()
    }

    /// Drops every record and returns how many were still live.
    fn clear(&mut self) -> usize {
        let live = self.live_count();
        self.records.clear();
        self.stats.set_entries_count(0);
        live
    }

    fn cleanup_expired(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired());
        self.stats.set_entries_count(self.records.len());
        before - self.records.len()
    }
}

// == Memory Cache ==
/// In-memory verdict cache. Not shared between processes and lost on restart.
#[derive(Debug)]
pub struct MemoryCache {
    store: RwLock<MemoryStore>,
    ttl: Duration,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache whose records live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        info!(ttl_secs = ttl.as_secs(), "In-memory verdict cache initialized");
        warn!("Using in-memory cache - data will be lost on restart");
        Self {
            store: RwLock::new(MemoryStore::default()),
            ttl,
        }
    }

    /// Number of records currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.store.read().await.records.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &ContentKey) -> Option<VerdictEnvelope> {
        let mut store = self.store.write().await;
        let payload = store.lookup(key.as_str())?;

        match serde_json::from_str::<VerdictEnvelope>(&payload) {
            Ok(envelope) if envelope.is_consistent() => {
                store.stats.record_hit();
                info!(%key, "Memory cache HIT");
                Some(envelope)
            }
            Ok(_) => {
                warn!(%key, "Discarding inconsistent cached verdict");
                store.discard_corrupt(key.as_str());
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "Discarding undecodable cached verdict");
                store.discard_corrupt(key.as_str());
                None
            }
        }
    }

    async fn set_with_ttl(
        &self,
        key: &ContentKey,
        envelope: &VerdictEnvelope,
        ttl: Duration,
    ) -> WriteOutcome {
        let payload = match serde_json::to_string(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%key, error = %e, "Failed to serialize verdict for caching");
                return WriteOutcome::SoftFailure(e.to_string());
            }
        };

        let record = CacheRecord::new(key.as_str(), payload, ttl);
        self.store.write().await.insert(record);
        info!(%key, ttl_secs = ttl.as_secs(), "Memory: cached verdict");
        WriteOutcome::Stored
    }

    async fn clear(&self) -> usize {
        let count = self.store.write().await.clear();
        info!(count, "Memory: cache cleared");
        count
    }

    async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let mut stats = store.stats.clone();
        stats.set_entries_count(store.live_count());
        stats
    }

    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    fn default_ttl(&self) -> Duration {
        self.ttl
    }

    async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }
}
