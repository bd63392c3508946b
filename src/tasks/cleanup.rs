//! Expired Verdict Cleanup Task
//!
//! Background task that periodically drops expired verdicts from the
//! in-memory backend. Redis expires records natively, so the purge is a no-op
//! there.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheBackend, CacheSelector};

/// Spawns a background task that periodically purges expired verdicts.
///
/// The backend is resolved through the selector on each tick, so the task
/// never forces backend selection before the first request needs it.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    selector: Arc<CacheSelector>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expired verdict cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if !selector.is_initialized() {
                debug!("Cleanup skipped: cache backend not selected yet");
                continue;
            }

            let removed = selector.get().await.purge_expired().await;
            if removed > 0 {
                info!("Cleanup: removed {} expired verdicts", removed);
            } else {
                debug!("Cleanup: no expired verdicts found");
            }
        }
    })
}
