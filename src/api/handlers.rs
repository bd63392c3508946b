//! API Handlers
//!
//! HTTP request handlers for each verdict service endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

use crate::cache::{CacheBackend, CacheSelector, CacheSettings};
use crate::collaborators::{HttpThumbnailAnalyzer, HttpTranscriptAnalyzer, YouTubeResolver};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    CacheStatistics, CacheStatsResponse, ClearCacheResponse, HealthResponse, VerdictRequest,
};
use crate::verdict::{QuotaStatus, RateGate, VerdictEnvelope, VerdictService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Verdict pipeline, owning the cache handle and the rate gate
    pub service: Arc<VerdictService>,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: VerdictService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the HTTP collaborators and a lazily selected cache backend.
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        if config.transcript_analyzer_url.is_none() {
            warn!("TRANSCRIPT_ANALYZER_URL not set; new verdicts will fail");
        }
        if config.thumbnail_analyzer_url.is_none() {
            warn!("THUMBNAIL_ANALYZER_URL not set; new verdicts will fail");
        }

        let service = VerdictService::new(
            Arc::new(HttpTranscriptAnalyzer::new(
                client.clone(),
                config.transcript_analyzer_url.clone(),
            )),
            Arc::new(HttpThumbnailAnalyzer::new(
                client.clone(),
                config.thumbnail_analyzer_url.clone(),
            )),
            Arc::new(YouTubeResolver::new(
                client,
                config.youtube_api_key.clone(),
                config.youtube_api_base.clone(),
            )),
            CacheSelector::new(CacheSettings::from_config(config)),
            RateGate::new(config.daily_limit),
            config.analyzer_timeout(),
        );
        Self::new(service, config.clone())
    }
}

/// Handler for POST /api/happyScroll/v1/verdict
///
/// Returns the combined verdict, from cache when available.
pub async fn verdict_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerdictRequest>, JsonRejection>,
) -> Result<Json<VerdictEnvelope>> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let outcome = state
        .service
        .verdict(&req.video_url)
        .await
        .map_err(|e| ApiError::from(e).for_env(state.config.app_env))?;

    info!(
        source = ?outcome.source,
        requests_today = outcome.quota.requests_today,
        remaining = outcome.quota.remaining,
        "Verdict served"
    );
    Ok(Json(outcome.envelope))
}

/// Handler for GET /api/happyScroll/v1/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = state.service.cache().get().await;
    let stats = cache.stats().await;
    let statistics = CacheStatistics::from_stats(
        &stats,
        cache.kind(),
        state.config.cache_ttl_days,
        state.config.seconds_saved_per_hit,
        state.config.cost_saved_per_hit,
    );

    info!(
        hit_rate = statistics.hit_rate_percentage,
        "Cache stats requested"
    );
    Json(CacheStatsResponse::new(statistics))
}

/// Handler for POST /api/happyScroll/v1/cache/clear
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cache = state.service.cache().get().await;
    let removed = cache.clear().await;

    warn!(removed, "Cache manually cleared");
    Json(ClearCacheResponse::new(removed))
}

/// Handler for GET /api/happyScroll/v1/quota
///
/// Reports the daily quota without consuming it.
pub async fn quota_handler(State(state): State<AppState>) -> Json<QuotaStatus> {
    Json(state.service.gate().status_now())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
