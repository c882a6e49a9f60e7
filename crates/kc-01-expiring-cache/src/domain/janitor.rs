//! # Janitor
//!
//! Background sweeper that calls [`ExpiringCache::clear_expired`] on a fixed
//! interval. Holds only a weak reference, so the cache is freed when its
//! owner drops it even if the janitor was never stopped.

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use shared_types::{CancelHandle, CancelToken};

use super::cache::ExpiringCache;

/// Handle to a running sweeper. Stops on `stop()` or drop.
#[derive(Debug)]
pub struct Janitor {
    stop: CancelHandle,
    task: JoinHandle<()>,
}

impl Janitor {
    /// Start sweeping `cache` every `interval`.
    pub fn spawn<K, V>(cache: &Arc<ExpiringCache<K, V>>, interval: Duration) -> Self
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let (stop, token) = CancelToken::new();
        let cache = Arc::downgrade(cache);
        let task = tokio::spawn(sweep_loop(cache, interval, token));
        Self { stop, task }
    }

    /// Stop sweeping. Idempotent.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether the sweep task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn sweep_loop<K, V>(cache: Weak<ExpiringCache<K, V>>, interval: Duration, stop: CancelToken)
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                let Some(cache) = cache.upgrade() else { break };
                let removed = cache.clear_expired();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "[kc-01] Swept expired entries");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_janitor_sweeps_on_interval() {
        let cache: Arc<ExpiringCache<&'static str, u8>> =
            Arc::new(ExpiringCache::new(Duration::ZERO));
        cache.set("a", 1, Duration::from_millis(10));
        cache.set("b", 2, Duration::from_secs(60));

        let janitor = Janitor::spawn(&cache, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.len(), 1);
        janitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_sweep_task() {
        let cache: Arc<ExpiringCache<&'static str, u8>> =
            Arc::new(ExpiringCache::new(Duration::ZERO));
        let janitor = Janitor::spawn(&cache, Duration::from_millis(10));
        janitor.stop();
        janitor.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(janitor.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_exits_when_cache_dropped() {
        let cache: Arc<ExpiringCache<&'static str, u8>> =
            Arc::new(ExpiringCache::new(Duration::ZERO));
        let janitor = Janitor::spawn(&cache, Duration::from_millis(10));
        drop(cache);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(janitor.is_finished());
    }
}
