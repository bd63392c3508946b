//! Redis Cache Module
//!
//! Persistent, shared verdict cache. Verdicts live under
//! `happyscroll:verdict:<id>` with a native TTL; cumulative counters live in
//! a separate hash that never expires and is never cleared.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, error, info, warn};

use crate::cache::{BackendKind, CacheBackend, CacheStats, WriteOutcome};
use crate::error::CacheError;
use crate::verdict::{ContentKey, VerdictEnvelope};

// == Key Layout ==
/// Namespace for verdict records
pub const VERDICT_KEY_PREFIX: &str = "happyscroll:verdict:";
/// Hash holding cumulative hits/misses/sets
pub const STATS_KEY: &str = "happyscroll:cache:stats";

const SCAN_BATCH: usize = 100;

/// Redis key for one verdict under `prefix`.
pub fn verdict_key(prefix: &str, key: &ContentKey) -> String {
    format!("{prefix}{key}")
}

/// Hides credentials in a Redis URL before it is logged.
pub fn mask_url(url: &str) -> String {
    match url.rsplit_once('@') {
        Some((head, host)) => {
            let scheme = head.split_once("://").map(|(s, _)| s).unwrap_or("redis");
            format!("{scheme}://***@{host}")
        }
        None => url.to_string(),
    }
}

/// Runs a Redis command future under a deadline.
async fn timed<T, F>(limit: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout),
    }
}

// == Redis Cache ==
/// Redis-backed verdict cache.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    ttl: Duration,
    op_timeout: Duration,
    verdict_prefix: String,
    stats_key: String,
}

impl RedisCache {
    // == Constructor ==
    /// Connects and probes the server with `PING`; fails fast when unreachable.
    pub async fn connect(url: &str, ttl: Duration, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let mut conn = match tokio::time::timeout(op_timeout, ConnectionManager::new(client)).await
        {
            Ok(conn) => conn?,
            Err(_) => return Err(CacheError::Timeout),
        };

        let pong: String = timed(op_timeout, redis::cmd("PING").query_async(&mut conn)).await?;
        debug!(%pong, "Redis reachability probe succeeded");
        info!(
            url = %mask_url(url),
            ttl_secs = ttl.as_secs(),
            "Redis verdict cache initialized"
        );

        Ok(Self {
            conn,
            ttl,
            op_timeout,
            verdict_prefix: VERDICT_KEY_PREFIX.to_string(),
            stats_key: STATS_KEY.to_string(),
        })
    }

    /// Moves verdicts and counters under `<namespace>:verdict:` and
    /// `<namespace>:cache:stats`.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.verdict_prefix = format!("{namespace}:verdict:");
        self.stats_key = format!("{namespace}:cache:stats");
        self
    }

    async fn bump(&self, field: &str) {
        let mut conn = self.conn.clone();
        let result: Result<i64, CacheError> = timed(
            self.op_timeout,
            redis::cmd("HINCRBY")
                .arg(self.stats_key.as_str())
                .arg(field)
                .arg(1)
                .query_async(&mut conn),
        )
        .await;
        if let Err(e) = result {
            warn!(field, error = %e, "Failed to update Redis cache counter");
        }
    }

    async fn read(&self, key: &ContentKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        timed(
            self.op_timeout,
            redis::cmd("GET")
                .arg(verdict_key(&self.verdict_prefix, key))
                .query_async(&mut conn),
        )
        .await
    }

    /// Removes an unreadable verdict so the next request recomputes it.
    async fn discard(&self, key: &ContentKey) {
        let mut conn = self.conn.clone();
        let result: Result<usize, CacheError> = timed(
            self.op_timeout,
            redis::cmd("DEL")
                .arg(verdict_key(&self.verdict_prefix, key))
                .query_async(&mut conn),
        )
        .await;
        if let Err(e) = result {
            warn!(%key, error = %e, "Failed to discard unreadable cached verdict");
        }
    }

    async fn write(
        &self,
        key: &ContentKey,
        envelope: &VerdictEnvelope,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(envelope)?;
        let mut conn = self.conn.clone();
        let _: () = timed(
            self.op_timeout,
            redis::cmd("SETEX")
                .arg(verdict_key(&self.verdict_prefix, key))
                .arg(ttl.as_secs().max(1))
                .arg(payload)
                .query_async(&mut conn),
        )
        .await?;
        Ok(())
    }

    /// All verdict keys currently stored, via cursor-based SCAN.
    async fn scan_verdict_keys(&self) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", self.verdict_prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = timed(
                self.op_timeout,
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern.as_str())
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn),
            )
            .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        let mut removed = 0;
        for chunk in keys.chunks(SCAN_BATCH) {
            let count: usize = timed(
                self.op_timeout,
                redis::cmd("DEL").arg(chunk.to_vec()).query_async(&mut conn),
            )
            .await?;
            removed += count;
        }
        Ok(removed)
    }

    async fn read_stats(&self) -> Result<CacheStats, CacheError> {
        let mut conn = self.conn.clone();
        let counters: HashMap<String, u64> = timed(
            self.op_timeout,
            redis::cmd("HGETALL").arg(self.stats_key.as_str()).query_async(&mut conn),
        )
        .await?;
        let entries = self.scan_verdict_keys().await?.len();

        let counter = |name: &str| counters.get(name).copied().unwrap_or(0);
        Ok(CacheStats {
            hits: counter("hits"),
            misses: counter("misses"),
            sets: counter("sets"),
            entries_count: entries,
        })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &ContentKey) -> Option<VerdictEnvelope> {
        let payload = match self.read(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.bump("misses").await;
                debug!(%key, "Redis cache MISS");
                return None;
            }
            Err(e) => {
                error!(%key, error = %e, "Redis GET failed, treating as miss");
                self.bump("misses").await;
                return None;
            }
        };

        match serde_json::from_str::<VerdictEnvelope>(&payload) {
            Ok(envelope) if envelope.is_consistent() => {
                self.bump("hits").await;
                info!(%key, "Redis cache HIT");
                Some(envelope)
            }
            Ok(_) => {
                warn!(%key, "Discarding inconsistent cached verdict");
                self.discard(key).await;
                self.bump("misses").await;
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "Discarding undecodable cached verdict");
                self.discard(key).await;
                self.bump("misses").await;
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
        match self.write(key, envelope, ttl).await {
            Ok(()) => {
                self.bump("sets").await;
                info!(%key, ttl_secs = ttl.as_secs(), "Redis: cached verdict");
                WriteOutcome::Stored
            }
            Err(e) => {
                error!(%key, error = %e, "Redis SET failed");
                WriteOutcome::SoftFailure(e.to_string())
            }
        }
    }

    async fn clear(&self) -> usize {
        let result = match self.scan_verdict_keys().await {
            Ok(keys) if keys.is_empty() => Ok(0),
            Ok(keys) => self.delete_keys(&keys).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(count) => {
                info!(count, "Redis: cache cleared");
                count
            }
            Err(e) => {
                error!(error = %e, "Redis CLEAR failed");
                0
            }
        }
    }

    async fn stats(&self) -> CacheStats {
        self.read_stats().await.unwrap_or_else(|e| {
            error!(error = %e, "Redis STATS failed");
            CacheStats::default()
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Persistent
    }

    fn default_ttl(&self) -> Duration {
        self.ttl
    }
}
