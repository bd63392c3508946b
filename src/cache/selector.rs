//! Cache Selector Module
//!
//! Picks the verdict cache backend once, on first use, and hands the same
//! instance to every later caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::cache::{mask_url, CacheBackend, MemoryCache, RedisCache, VerdictCache, DEFAULT_TTL};
use crate::config::Config;

// == Cache Settings ==
/// Inputs to backend selection.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl: Duration,
    pub redis_timeout: Duration,
}

impl CacheSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            ttl: config.cache_ttl(),
            redis_timeout: config.redis_timeout(),
        }
    }

    /// Settings that always select the in-memory backend.
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            redis_url: None,
            ttl,
            redis_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::in_memory(DEFAULT_TTL)
    }
}

/// Chooses a backend: Redis when configured and reachable, memory otherwise.
pub async fn select_backend(settings: &CacheSettings) -> VerdictCache {
    if let Some(url) = settings.redis_url.as_deref() {
        match RedisCache::connect(url, settings.ttl, settings.redis_timeout).await {
            Ok(cache) => {
                info!("Using Redis cache (persistent, shared)");
                return VerdictCache::Persistent(cache);
            }
            Err(e) => {
                warn!(url = %mask_url(url), error = %e, "Failed to initialize Redis cache");
                warn!("Falling back to in-memory cache");
            }
        }
    }

    info!("Using in-memory cache (non-persistent)");
    VerdictCache::InMemory(MemoryCache::new(settings.ttl))
}

// == Cache Selector ==
/// Lazily initialized, process-wide verdict cache handle.
pub struct CacheSelector {
    settings: CacheSettings,
    cell: OnceCell<Arc<VerdictCache>>,
}

impl CacheSelector {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            settings,
            cell: OnceCell::new(),
        }
    }

    /// Selector with the backend already chosen.
    pub fn with_cache(cache: VerdictCache) -> Self {
        Self {
            settings: CacheSettings::in_memory(cache.default_ttl()),
            cell: OnceCell::new_with(Some(Arc::new(cache))),
        }
    }

    /// Returns the selected backend, choosing it on the first call.
    pub async fn get(&self) -> Arc<VerdictCache> {
        self.cell
            .get_or_init(|| async { Arc::new(select_backend(&self.settings).await) })
            .await
            .clone()
    }

    /// True once a backend has been chosen.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BackendKind;

    #[tokio::test]
    async fn test_no_url_selects_memory() {
        let cache = select_backend(&CacheSettings::default()).await;
        assert_eq!(cache.kind(), BackendKind::InMemory);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let settings = CacheSettings {
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            ttl: Duration::from_secs(60),
            redis_timeout: Duration::from_millis(500),
        };

        let cache = select_backend(&settings).await;
        assert_eq!(cache.kind(), BackendKind::InMemory);
        assert_eq!(cache.default_ttl(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_selector_memoizes_instance() {
        let selector = CacheSelector::new(CacheSettings::default());
        assert!(!selector.is_initialized());

        let first = selector.get().await;
        let second = selector.get().await;

        assert!(selector.is_initialized());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_first_use_yields_one_instance() {
        let selector = Arc::new(CacheSelector::new(CacheSettings::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let selector = selector.clone();
                tokio::spawn(async move { selector.get().await })
            })
            .collect();

        let mut instances = Vec::new();
        for handle in handles {
            instances.push(handle.await.unwrap());
        }
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_with_cache_is_preselected() {
        let selector =
            CacheSelector::with_cache(VerdictCache::InMemory(MemoryCache::new(DEFAULT_TTL)));
        assert!(selector.is_initialized());
        assert_eq!(selector.get().await.kind(), BackendKind::InMemory);
    }
}
