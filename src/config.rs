//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::time::Duration;

// == App Environment ==
/// Deployment environment, controls error detail and default log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Dev,
    Prod,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => AppEnv::Prod,
            _ => AppEnv::Dev,
        }
    }

    /// Returns true when internal error details may be shown to clients.
    pub fn is_dev(&self) -> bool {
        matches!(self, AppEnv::Dev)
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Deployment environment
    pub app_env: AppEnv,
    /// Redis connection URL; the in-memory cache is used when absent
    pub redis_url: Option<String>,
    /// Days a verdict stays cached
    pub cache_ttl_days: u64,
    /// New (non-cached) analyses allowed per calendar day
    pub daily_limit: u64,
    /// Per-call timeout for each upstream analyzer, in seconds
    pub analyzer_timeout_secs: u64,
    /// Connect and per-command timeout for Redis, in seconds
    pub redis_timeout_secs: u64,
    /// Background purge interval for expired in-memory verdicts, in seconds
    pub cleanup_interval: u64,
    /// Endpoint of the transcript-safety analyzer
    pub transcript_analyzer_url: Option<String>,
    /// Endpoint of the thumbnail-safety analyzer
    pub thumbnail_analyzer_url: Option<String>,
    /// YouTube Data API key used by the metadata resolver
    pub youtube_api_key: Option<String>,
    /// YouTube Data API base URL
    pub youtube_api_base: String,
    /// Analysis time avoided by one cache hit, in seconds
    pub seconds_saved_per_hit: u64,
    /// Upstream cost avoided by one cache hit, in USD
    pub cost_saved_per_hit: f64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `APP_ENV` - `dev` or `prod` (default: dev)
    /// - `REDIS_URL` - Redis URL (default: unset, in-memory cache)
    /// - `CACHE_TTL_DAYS` - Verdict TTL in days (default: 7)
    /// - `DAILY_LIMIT` - New analyses per day (default: 150)
    /// - `ANALYZER_TIMEOUT_SECS` - Upstream call timeout (default: 30)
    /// - `REDIS_TIMEOUT_SECS` - Redis timeout (default: 5)
    /// - `CLEANUP_INTERVAL` - Expired entry purge interval (default: 60)
    /// - `TRANSCRIPT_ANALYZER_URL`, `THUMBNAIL_ANALYZER_URL` - collaborator endpoints
    /// - `YOUTUBE_API_KEY`, `YOUTUBE_API_BASE` - metadata resolver settings
    /// - `SECONDS_SAVED_PER_HIT`, `COST_SAVED_PER_HIT` - stats reporting factors
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            app_env: env::var("APP_ENV")
                .map(|v| AppEnv::parse(&v))
                .unwrap_or(defaults.app_env),
            redis_url: non_empty_var("REDIS_URL"),
            cache_ttl_days: parse_var("CACHE_TTL_DAYS").unwrap_or(defaults.cache_ttl_days),
            daily_limit: parse_var("DAILY_LIMIT").unwrap_or(defaults.daily_limit),
            analyzer_timeout_secs: parse_var("ANALYZER_TIMEOUT_SECS")
                .unwrap_or(defaults.analyzer_timeout_secs),
            redis_timeout_secs: parse_var("REDIS_TIMEOUT_SECS")
                .unwrap_or(defaults.redis_timeout_secs),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            transcript_analyzer_url: non_empty_var("TRANSCRIPT_ANALYZER_URL"),
            thumbnail_analyzer_url: non_empty_var("THUMBNAIL_ANALYZER_URL"),
            youtube_api_key: non_empty_var("YOUTUBE_API_KEY"),
            youtube_api_base: non_empty_var("YOUTUBE_API_BASE")
                .unwrap_or(defaults.youtube_api_base),
            seconds_saved_per_hit: parse_var("SECONDS_SAVED_PER_HIT")
                .unwrap_or(defaults.seconds_saved_per_hit),
            cost_saved_per_hit: parse_var("COST_SAVED_PER_HIT")
                .unwrap_or(defaults.cost_saved_per_hit),
        }
    }

    /// Verdict TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days.saturating_mul(24 * 60 * 60))
    }

    /// Upstream analyzer timeout as a Duration.
    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer_timeout_secs)
    }

    /// Redis timeout as a Duration.
    pub fn redis_timeout(&self) -> Duration {
        Duration::from_secs(self.redis_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            app_env: AppEnv::Dev,
            redis_url: None,
            cache_ttl_days: 7,
            daily_limit: 150,
            analyzer_timeout_secs: 30,
            redis_timeout_secs: 5,
            cleanup_interval: 60,
            transcript_analyzer_url: None,
            thumbnail_analyzer_url: None,
            youtube_api_key: None,
            youtube_api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            seconds_saved_per_hit: 20,
            cost_saved_per_hit: 0.002,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.daily_limit, 150);
        assert_eq!(config.cache_ttl_days, 7);
        assert_eq!(config.cache_ttl(), Duration::from_secs(604_800));
        assert!(config.redis_url.is_none());
        assert!(config.app_env.is_dev());
    }

    #[test]
    fn test_cache_ttl_saturates_for_huge_day_counts() {
        let config = Config {
            cache_ttl_days: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.cache_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_app_env_parse() {
        assert_eq!(AppEnv::parse("prod"), AppEnv::Prod);
        assert_eq!(AppEnv::parse(" Production "), AppEnv::Prod);
        assert_eq!(AppEnv::parse("dev"), AppEnv::Dev);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Dev);
    }
}
