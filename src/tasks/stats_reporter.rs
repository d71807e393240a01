//! Cache Stats Reporter
//!
//! Background task that periodically logs the object cache's statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::ObjectCache;

/// Spawns a background task that logs a cache statistics snapshot every
/// `interval_secs` seconds.
///
/// The task never touches the cache entries; it only reads the counters.
/// An interval of zero is treated as one second.
///
/// # Returns
/// A JoinHandle for the spawned task, which should be aborted during
/// graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ObjectCache::new(100));
/// let reporter = spawn_stats_reporter(cache.clone(), 60);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(cache: Arc<ObjectCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval_secs = interval_secs.max(1);
    let period = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache stats reporter with interval of {} seconds",
            interval_secs
        );

        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let stats = cache.stats();
            info!(
                hits = stats.hits,
                misses = stats.misses,
                inserts = stats.inserts,
                evictions = stats.evictions,
                flushes = stats.flushes,
                entries = stats.entries,
                capacity = stats.capacity,
                hit_rate = stats.hit_rate(),
                "Cache stats"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reporter_leaves_entries_untouched() {
        let cache = Arc::new(ObjectCache::new(10));
        cache.put("note_1", 1_i64);

        let handle = spawn_stats_reporter(cache.clone(), 1);

        // Wait for at least one report
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!handle.is_finished(), "Reporter should keep running");
        assert_eq!(*cache.get::<i64>("note_1").unwrap().unwrap(), 1);
        assert_eq!(cache.stats().inserts, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_reporter_can_be_aborted() {
        let cache = Arc::new(ObjectCache::new(10));

        let handle = spawn_stats_reporter(cache, 1);

        // Abort immediately
        handle.abort();

        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_reporter_zero_interval_is_clamped() {
        let cache = Arc::new(ObjectCache::new(10));

        // Duration::ZERO would panic inside tokio::time::interval
        let handle = spawn_stats_reporter(cache, 0);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        handle.abort();
    }
}
