//! Verdict Service Module
//!
//! Request lifecycle for one verdict:
//! validate -> cache lookup -> admission -> fan-out -> join -> combine -> persist.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{CacheBackend, CacheSelector, WriteOutcome};
use crate::collaborators::{
    AnalyzerError, AnalyzerOutcome, MetadataResolver, ThumbnailAnalyzer, TranscriptAnalyzer,
};
use crate::error::ApiError;
use crate::verdict::{
    ContentKey, LocatorError, QuotaExceeded, QuotaStatus, RateGate, ThumbnailVerdict,
    TranscriptVerdict, VerdictEnvelope,
};

// == Verdict Error ==
/// Terminal failure states of a verdict request.
#[derive(Error, Debug)]
pub enum VerdictError {
    #[error(transparent)]
    InvalidLocator(#[from] LocatorError),

    #[error("daily limit reached ({}/{})", .0.requests_today, .0.limit)]
    QuotaExceeded(QuotaStatus),

    #[error("transcript analysis failed: {0}")]
    Transcript(AnalyzerError),

    #[error("thumbnail analysis failed: {0}")]
    Thumbnail(AnalyzerError),

    #[error("{0}")]
    Internal(String),
}

impl From<QuotaExceeded> for VerdictError {
    fn from(QuotaExceeded(status): QuotaExceeded) -> Self {
        VerdictError::QuotaExceeded(status)
    }
}

impl From<VerdictError> for ApiError {
    fn from(err: VerdictError) -> Self {
        match err {
            VerdictError::InvalidLocator(e) => ApiError::InvalidRequest(e.to_string()),
            VerdictError::QuotaExceeded(status) => ApiError::QuotaExceeded {
                limit: status.limit,
                requests_today: status.requests_today,
            },
            VerdictError::Transcript(AnalyzerError::Validation(m)) => {
                ApiError::UpstreamValidation(format!("Invalid YouTube URL: {m}"))
            }
            VerdictError::Transcript(AnalyzerError::Processing(m)) => {
                ApiError::UpstreamProcessing(format!("Video transcript analysis failed: {m}"))
            }
            VerdictError::Thumbnail(AnalyzerError::Validation(m)) => {
                ApiError::UpstreamValidation(format!("YouTube metadata extraction failed: {m}"))
            }
            VerdictError::Thumbnail(AnalyzerError::Processing(m)) => {
                ApiError::UpstreamProcessing(format!("Thumbnail moderation failed: {m}"))
            }
            VerdictError::Internal(m) => ApiError::Internal(m),
        }
    }
}

// == Verdict Outcome ==
/// Where a returned verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Cache,
    Fresh,
}

/// A successful verdict plus what it cost.
#[derive(Debug, Clone)]
pub struct VerdictOutcome {
    pub envelope: VerdictEnvelope,
    pub source: VerdictSource,
    /// Quota view after this request
    pub quota: QuotaStatus,
    /// Cache write result; `None` for cache hits
    pub write: Option<WriteOutcome>,
}

/// Runs one collaborator call under its own deadline; a timeout is a processing failure.
async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> AnalyzerOutcome<T>
where
    F: Future<Output = AnalyzerOutcome<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AnalyzerError::Processing(format!(
            "{what} timed out after {}s",
            limit.as_secs()
        ))),
    }
}

async fn transcript_branch(
    analyzer: Arc<dyn TranscriptAnalyzer>,
    video_url: String,
    limit: Duration,
) -> AnalyzerOutcome<TranscriptVerdict> {
    info!("Starting transcript analysis");
    let assessment = bounded(limit, "transcript analysis", analyzer.analyze(&video_url)).await?;
    info!(safe = assessment.is_safe, "Transcript analysis complete");
    Ok(TranscriptVerdict {
        is_safe: assessment.is_safe,
        reason: assessment.reason,
    })
}

async fn thumbnail_branch(
    resolver: Arc<dyn MetadataResolver>,
    analyzer: Arc<dyn ThumbnailAnalyzer>,
    key: ContentKey,
    limit: Duration,
) -> AnalyzerOutcome<ThumbnailVerdict> {
    info!("Starting thumbnail analysis");
    let metadata = bounded(limit, "metadata lookup", resolver.resolve(&key)).await?;
    let assessment = bounded(
        limit,
        "thumbnail analysis",
        analyzer.analyze(&metadata.thumbnail_url),
    )
    .await?;
    info!(
        safe = assessment.allowed,
        flagged = ?assessment.flagged(),
        "Thumbnail analysis complete"
    );
    Ok(ThumbnailVerdict {
        is_safe: assessment.allowed,
        reason: assessment.reason(),
        video_title: metadata.title,
        channel_title: metadata.channel,
    })
}

// == Verdict Service ==
/// Owns the shared cache handle and rate gate, and drives each request.
pub struct VerdictService {
    transcript: Arc<dyn TranscriptAnalyzer>,
    thumbnail: Arc<dyn ThumbnailAnalyzer>,
    resolver: Arc<dyn MetadataResolver>,
    cache: Arc<CacheSelector>,
    gate: RateGate,
    analyzer_timeout: Duration,
}

impl VerdictService {
    pub fn new(
        transcript: Arc<dyn TranscriptAnalyzer>,
        thumbnail: Arc<dyn ThumbnailAnalyzer>,
        resolver: Arc<dyn MetadataResolver>,
        cache: CacheSelector,
        gate: RateGate,
        analyzer_timeout: Duration,
    ) -> Self {
        Self {
            transcript,
            thumbnail,
            resolver,
            cache: Arc::new(cache),
            gate,
            analyzer_timeout,
        }
    }

    pub fn cache(&self) -> &Arc<CacheSelector> {
        &self.cache
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    /// Produces the verdict for `video_url`, from cache when possible.
    pub async fn verdict(&self, video_url: &str) -> Result<VerdictOutcome, VerdictError> {
        let video_url = video_url.trim();
        let key = ContentKey::from_locator(video_url)?;
        info!(video_id = %key, "Verdict requested");

        let cache = self.cache.get().await;
        if let Some(envelope) = cache.get(&key).await {
            info!(video_id = %key, "Serving verdict from cache; quota untouched");
            return Ok(VerdictOutcome {
                envelope,
                source: VerdictSource::Cache,
                quota: self.gate.status_now(),
                write: None,
            });
        }

        let preflight = self.gate.peek()?;
        info!(
            requests_today = preflight.requests_today,
            limit = preflight.limit,
            remaining = preflight.remaining,
            "Cache miss, checking quota"
        );
        let quota = self.gate.check_and_increment()?;

        let (transcript, thumbnail) = self.fan_out(video_url, &key).await?;
        let envelope = VerdictEnvelope::combine(transcript, thumbnail);
        info!(
            video_id = %key,
            is_safe = envelope.is_safe(),
            transcript_safe = envelope.is_safe_transcript(),
            thumbnail_safe = envelope.is_safe_thumbnail(),
            "Final verdict"
        );

        let write = cache.set(&key, &envelope).await;
        if let WriteOutcome::SoftFailure(reason) = &write {
            warn!(video_id = %key, %reason, "Verdict not cached");
        }

        Ok(VerdictOutcome {
            envelope,
            source: VerdictSource::Fresh,
            quota,
            write: Some(write),
        })
    }

    /// Runs both analyses as separate tasks and waits for both.
    ///
    /// A failure in one branch never cancels the other. When both fail, the
    /// transcript failure is reported.
    async fn fan_out(
        &self,
        video_url: &str,
        key: &ContentKey,
    ) -> Result<(TranscriptVerdict, ThumbnailVerdict), VerdictError> {
        let transcript_task = tokio::spawn(transcript_branch(
            self.transcript.clone(),
            video_url.to_string(),
            self.analyzer_timeout,
        ));
        let thumbnail_task = tokio::spawn(thumbnail_branch(
            self.resolver.clone(),
            self.thumbnail.clone(),
            key.clone(),
            self.analyzer_timeout,
        ));

        let (transcript, thumbnail) = tokio::join!(transcript_task, thumbnail_task);
        let transcript =
            transcript.map_err(|e| VerdictError::Internal(format!("transcript task failed: {e}")))?;
        let thumbnail =
            thumbnail.map_err(|e| VerdictError::Internal(format!("thumbnail task failed: {e}")))?;

        match (transcript, thumbnail) {
            (Ok(t), Ok(th)) => Ok((t, th)),
            (Err(e), _) => {
                warn!(error = %e, "Transcript branch failed");
                Err(VerdictError::Transcript(e))
            }
            (_, Err(e)) => {
                warn!(error = %e, "Thumbnail branch failed");
                Err(VerdictError::Thumbnail(e))
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::cache::{MemoryCache, VerdictCache, DEFAULT_TTL};
    use crate::collaborators::{ThumbnailAssessment, TranscriptAssessment, VideoMetadata};
    use crate::verdict::{REASON_BOTH_SAFE, REASON_THUMBNAIL_UNSAFE};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    struct FakeTranscript {
        outcome: AnalyzerOutcome<TranscriptAssessment>,
        delay: Duration,
        calls: AtomicUsize,
        completed: AtomicUsize,
    }

    impl FakeTranscript {
        fn new(outcome: AnalyzerOutcome<TranscriptAssessment>) -> Arc<Self> {
            Self::delayed(outcome, Duration::ZERO)
        }

        fn delayed(outcome: AnalyzerOutcome<TranscriptAssessment>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                delay,
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranscriptAnalyzer for FakeTranscript {
        async fn analyze(&self, _video_url: &str) -> AnalyzerOutcome<TranscriptAssessment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    struct FakeThumbnail(AnalyzerOutcome<ThumbnailAssessment>);

    #[async_trait]
    impl ThumbnailAnalyzer for FakeThumbnail {
        async fn analyze(&self, _image_url: &str) -> AnalyzerOutcome<ThumbnailAssessment> {
            self.0.clone()
        }
    }

    struct FakeResolver;

    #[async_trait]
    impl MetadataResolver for FakeResolver {
        async fn resolve(&self, video: &ContentKey) -> AnalyzerOutcome<VideoMetadata> {
            Ok(VideoMetadata {
                thumbnail_url: format!("https://i.ytimg.com/vi/{video}/hqdefault.jpg"),
                title: "Counting Song".to_string(),
                channel: "Kids TV".to_string(),
            })
        }
    }

    fn safe_transcript() -> AnalyzerOutcome<TranscriptAssessment> {
        Ok(TranscriptAssessment {
            is_safe: true,
            reason: "Educational content.".to_string(),
        })
    }

    fn thumbnail(allowed: bool) -> AnalyzerOutcome<ThumbnailAssessment> {
        let mut assessment = ThumbnailAssessment {
            allowed,
            ..Default::default()
        };
        assessment.categories.insert("racy".to_string(), !allowed);
        Ok(assessment)
    }

    fn service(
        transcript: Arc<FakeTranscript>,
        thumbnail: AnalyzerOutcome<ThumbnailAssessment>,
        limit: u64,
    ) -> VerdictService {
        VerdictService::new(
            transcript,
            Arc::new(FakeThumbnail(thumbnail)),
            Arc::new(FakeResolver),
            CacheSelector::with_cache(VerdictCache::InMemory(MemoryCache::new(DEFAULT_TTL))),
            RateGate::new(limit),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_fresh_then_cached() {
        let transcript = FakeTranscript::new(safe_transcript());
        let svc = service(transcript.clone(), thumbnail(false), 10);

        let first = svc.verdict(URL).await.unwrap();
        assert_eq!(first.source, VerdictSource::Fresh);
        assert!(!first.envelope.is_safe());
        assert_eq!(first.envelope.overall_reason(), REASON_THUMBNAIL_UNSAFE);
        assert_eq!(first.envelope.thumbnail_reason(), "Thumbnail flagged as UNSAFE. Detected: racy.");
        assert_eq!(first.quota.requests_today, 1);
        assert_eq!(first.write, Some(WriteOutcome::Stored));

        let second = svc.verdict("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert_eq!(second.source, VerdictSource::Cache);
        assert_eq!(second.envelope, first.envelope);
        assert_eq!(second.quota.requests_today, 1);
        assert_eq!(transcript.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_locator_never_touches_gate() {
        let svc = service(FakeTranscript::new(safe_transcript()), thumbnail(true), 10);

        let err = svc.verdict("https://vimeo.com/1").await.unwrap_err();
        assert!(matches!(err, VerdictError::InvalidLocator(LocatorError::NotYouTube)));
        assert_eq!(svc.gate().status_now().requests_today, 0);
    }

    #[tokio::test]
    async fn test_quota_exhausted_rejects_misses_but_serves_hits() {
        let svc = service(FakeTranscript::new(safe_transcript()), thumbnail(true), 1);

        let first = svc.verdict(URL).await.unwrap();
        assert_eq!(first.envelope.overall_reason(), REASON_BOTH_SAFE);

        let err = svc
            .verdict("https://www.youtube.com/watch?v=aaaaaaaaaaa")
            .await
            .unwrap_err();
        assert!(matches!(err, VerdictError::QuotaExceeded(s) if s.requests_today == 1 && s.limit == 1));

        let hit = svc.verdict(URL).await.unwrap();
        assert_eq!(hit.source, VerdictSource::Cache);
    }

    #[tokio::test]
    async fn test_failed_analysis_keeps_quota_charge_and_caches_nothing() {
        let transcript = FakeTranscript::new(Err(AnalyzerError::Processing("upstream 503".into())));
        let svc = service(transcript, thumbnail(true), 10);

        let err = svc.verdict(URL).await.unwrap_err();
        assert!(matches!(err, VerdictError::Transcript(AnalyzerError::Processing(_))));
        assert_eq!(svc.gate().status_now().requests_today, 1);

        let cache = svc.cache().get().await;
        assert_eq!(cache.stats().await.entries_count, 0);
    }

    #[tokio::test]
    async fn test_thumbnail_failure_waits_for_transcript() {
        let transcript =
            FakeTranscript::delayed(safe_transcript(), Duration::from_millis(100));
        let svc = service(
            transcript.clone(),
            Err(AnalyzerError::Validation("Video not found".into())),
            10,
        );

        let err = svc.verdict(URL).await.unwrap_err();
        assert!(matches!(err, VerdictError::Thumbnail(AnalyzerError::Validation(_))));
        assert_eq!(transcript.completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transcript_failure_reported_first_when_both_fail() {
        let svc = service(
            FakeTranscript::new(Err(AnalyzerError::Validation("no captions".into()))),
            Err(AnalyzerError::Processing("vision down".into())),
            10,
        );

        let err = svc.verdict(URL).await.unwrap_err();
        assert!(matches!(err, VerdictError::Transcript(AnalyzerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_analyzer_timeout_is_processing_failure() {
        let transcript = FakeTranscript::delayed(safe_transcript(), Duration::from_secs(3));
        let svc = VerdictService::new(
            transcript,
            Arc::new(FakeThumbnail(thumbnail(true))),
            Arc::new(FakeResolver),
            CacheSelector::with_cache(VerdictCache::InMemory(MemoryCache::new(DEFAULT_TTL))),
            RateGate::new(10),
            Duration::from_millis(50),
        );

        let err = svc.verdict(URL).await.unwrap_err();
        assert!(matches!(
            err,
            VerdictError::Transcript(AnalyzerError::Processing(ref m)) if m.contains("timed out")
        ));
    }

    #[test]
    fn test_error_mapping_to_api() {
        let api: ApiError = VerdictError::Thumbnail(AnalyzerError::Validation("x".into())).into();
        assert!(matches!(api, ApiError::UpstreamValidation(ref m) if m == "YouTube metadata extraction failed: x"));

        let api: ApiError = VerdictError::Transcript(AnalyzerError::Processing("y".into())).into();
        assert!(matches!(api, ApiError::UpstreamProcessing(ref m) if m == "Video transcript analysis failed: y"));

        let api: ApiError = VerdictError::QuotaExceeded(QuotaStatus {
            requests_today: 150,
            limit: 150,
            remaining: 0,
        })
        .into();
        assert!(matches!(api, ApiError::QuotaExceeded { limit: 150, requests_today: 150 }));
    }
}
