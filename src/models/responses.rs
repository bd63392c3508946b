//! Response DTOs for the verdict API
//!
//! Defines the structure of outgoing HTTP response bodies. The verdict
//! itself is returned as [`crate::verdict::VerdictEnvelope`].

use serde::Serialize;

use crate::cache::{BackendKind, CacheStats};

/// Rounds to `places` decimal places for display.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Cache effectiveness figures (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatistics {
    pub cache_type: String,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_requests: u64,
    pub hit_rate_percentage: f64,
    pub cached_entries: usize,
    pub cache_sets: u64,
    pub ttl_days: u64,
    pub time_saved_seconds: u64,
    pub time_saved_minutes: f64,
    pub estimated_cost_saved_usd: f64,
    pub persistent: bool,
    pub shared: bool,
}

impl CacheStatistics {
    /// Derives reporting figures from raw backend counters.
    pub fn from_stats(
        stats: &CacheStats,
        kind: BackendKind,
        ttl_days: u64,
        seconds_saved_per_hit: u64,
        cost_saved_per_hit: f64,
    ) -> Self {
        let time_saved_seconds = stats.hits.saturating_mul(seconds_saved_per_hit);
        Self {
            cache_type: kind.label().to_string(),
            cache_hits: stats.hits,
            cache_misses: stats.misses,
            total_requests: stats.total_requests(),
            hit_rate_percentage: round_to(stats.hit_rate() * 100.0, 2),
            cached_entries: stats.entries_count,
            cache_sets: stats.sets,
            ttl_days,
            time_saved_seconds,
            time_saved_minutes: round_to(time_saved_seconds as f64 / 60.0, 2),
            estimated_cost_saved_usd: round_to(stats.hits as f64 * cost_saved_per_hit, 4),
            persistent: kind.is_persistent(),
            shared: kind.is_shared(),
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub status: String,
    pub cache_statistics: CacheStatistics,
    pub message: String,
}

impl CacheStatsResponse {
    pub fn new(cache_statistics: CacheStatistics) -> Self {
        Self {
            status: "success".to_string(),
            message: format!(
                "Cache is {}% effective",
                cache_statistics.hit_rate_percentage
            ),
            cache_statistics,
        }
    }
}

/// Response body for POST /cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub status: String,
    pub message: String,
    pub entries_removed: usize,
}

impl ClearCacheResponse {
    pub fn new(entries_removed: usize) -> Self {
        Self {
            status: "success".to_string(),
            message: "Cache cleared successfully".to_string(),
            entries_removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_derived_fields() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            sets: 1,
            entries_count: 1,
        };
        let s = CacheStatistics::from_stats(&stats, BackendKind::InMemory, 7, 20, 0.002);

        assert_eq!(s.total_requests, 4);
        assert_eq!(s.hit_rate_percentage, 75.0);
        assert_eq!(s.time_saved_seconds, 60);
        assert_eq!(s.time_saved_minutes, 1.0);
        assert_eq!(s.estimated_cost_saved_usd, 0.006);
        assert_eq!(s.cache_type, "In-Memory (Non-Persistent)");
        assert!(!s.persistent);
        assert!(!s.shared);
    }

    #[test]
    fn test_hit_rate_rounding() {
        let stats = CacheStats {
            hits: 1,
            misses: 2,
            sets: 0,
            entries_count: 0,
        };
        let s = CacheStatistics::from_stats(&stats, BackendKind::Persistent, 7, 20, 0.002);
        assert_eq!(s.hit_rate_percentage, 33.33);
        assert!(s.persistent && s.shared);
    }

    #[test]
    fn test_time_saved_saturates() {
        let stats = CacheStats {
            hits: u64::MAX / 2,
            misses: 0,
            sets: 0,
            entries_count: 0,
        };
        let s = CacheStatistics::from_stats(&stats, BackendKind::InMemory, 7, 20, 0.002);
        assert_eq!(s.time_saved_seconds, u64::MAX);
    }

    #[test]
    fn test_stats_response_message() {
        let s = CacheStatistics::from_stats(&CacheStats::new(), BackendKind::InMemory, 7, 20, 0.002);
        let resp = CacheStatsResponse::new(s);
        assert_eq!(resp.status, "success");
        assert_eq!(resp.message, "Cache is 0% effective");
    }

    #[test]
    fn test_clear_response_serialize() {
        let json = serde_json::to_value(ClearCacheResponse::new(4)).unwrap();
        assert_eq!(json["entries_removed"], 4);
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
