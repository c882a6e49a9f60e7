//! # Acceptance Scenarios
//!
//! One scenario per subsystem, exercised through the public crate APIs:
//!
//! - **A** (kc-01): an entry is readable until its TTL passes
//! - **B** (kc-03): accepting a key locks its identifier until a confirmed
//!   perform log arrives
//! - **C** (kc-02): a pool of 2 runs 5 tasks of 10ms in 3 waves with no
//!   duplicate results

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    use kc_01_expiring_cache::{ExpiringCache, DEFAULT_EXPIRATION};
    use kc_02_worker_pool::{task, PoolConfig, WorkerPool};
    use kc_03_transmission_coordinator::{
        CoordinatorConfig, CoordinatorError, TransmissionApi, TransmissionCoordinator,
    };
    use shared_types::{CancelToken, DelimitedKeys, UpkeepKey};

    use crate::fixtures::QueuedLogs;

    #[tokio::test(start_paused = true)]
    async fn scenario_a_entry_expires_after_ttl() {
        let cache: ExpiringCache<&str, i32> = ExpiringCache::new(DEFAULT_EXPIRATION);

        cache.set("x", 5, Duration::from_millis(50));
        assert_eq!(cache.get("x"), Some(5));

        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(cache.get("x"), None);
        assert_eq!(cache.clear_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn scenario_b_accept_locks_until_confirmed() {
        let logs = Arc::new(QueuedLogs::default());
        let config = CoordinatorConfig {
            min_confirmations: 1,
            ..Default::default()
        };
        let coordinator =
            TransmissionCoordinator::new(config, Arc::clone(&logs), Arc::new(DelimitedKeys)).unwrap();

        let accepted = UpkeepKey::from_raw("100|42");
        let later = UpkeepKey::from_raw("101|42");
        assert!(coordinator.is_eligible(&accepted));

        coordinator.accept(&accepted).unwrap();
        assert!(!coordinator.is_eligible(&accepted));
        assert!(!coordinator.is_eligible(&later));
        assert!(!coordinator.is_transmission_confirmed(&accepted));
        assert!(matches!(
            coordinator.accept(&later),
            Err(CoordinatorError::AlreadySet { .. })
        ));

        logs.push(accepted.clone(), 100, 2);
        assert_eq!(coordinator.poll_once().await.unwrap(), 1);

        assert!(coordinator.is_eligible(&later));
        assert!(coordinator.is_transmission_confirmed(&accepted));
        coordinator.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_c_two_workers_five_tasks() {
        let pool: WorkerPool<usize, String> = WorkerPool::new(PoolConfig::with_workers(2)).unwrap();
        let mut results = pool.take_results().unwrap();
        let cancel = CancelToken::never();
        let started = Instant::now();

        let mut submitted = HashSet::new();
        for i in 0..5 {
            let work = task(move |_| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(i)
            });
            submitted.insert(pool.submit(work, &cancel).await.unwrap());
        }

        let mut seen = HashSet::new();
        let mut values = HashSet::new();
        while seen.len() < 5 {
            let result = tokio::time::timeout(Duration::from_secs(1), results.recv())
                .await
                .expect("timed out waiting for results")
                .expect("results stream closed");
            assert!(seen.insert(result.task_id), "duplicate result");
            values.insert(result.value.unwrap());
        }

        assert_eq!(seen, submitted);
        assert_eq!(values, (0..5).collect());
        assert!(started.elapsed() < Duration::from_millis(40));
        assert!(pool.active_workers() <= 2);
        pool.stop();
    }
}
