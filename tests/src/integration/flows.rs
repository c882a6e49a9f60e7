//! # Integration Test Flows
//!
//! Full rounds through the Sampling Verifier with the Transmission
//! Coordinator plugged in as its filter, the way a keeper node wires them.
//!
//! ## Flow Tested
//!
//! ```text
//! head ──→ Sampling Verifier ──observe()──→ reporting layer
//!                 ↑                              │ accept(key)
//!                 │ is_eligible                  ↓
//!                 └──────────────────── Transmission Coordinator
//!                                                ↑ perform logs
//!                                           Log Provider
//! ```

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use kc_03_transmission_coordinator::{
        CoordinatorConfig, TransmissionApi, TransmissionCoordinator,
    };
    use kc_04_sampling_verifier::{
        CoordinatorFilter, KeeperConfig, Observation, SamplingVerifier, VerifierApi,
    };
    use shared_types::{BlockKey, CancelToken, DelimitedKeys, UpkeepIdentifier, UpkeepKey};

    use crate::fixtures::{
        collaborators, init_logging, keys_at, PendingSet, QueuedLogs, StaticKeys, StaticRegistry,
    };

    type Coordinator = TransmissionCoordinator<QueuedLogs, DelimitedKeys>;

    struct Keeper {
        verifier: SamplingVerifier,
        coordinator: Arc<Coordinator>,
        registry: Arc<StaticRegistry>,
        keys: Arc<StaticKeys>,
        pending: Arc<PendingSet>,
        logs: Arc<QueuedLogs>,
        heads: mpsc::Sender<BlockKey>,
    }

    fn keeper(config: KeeperConfig, eligible: &[u64]) -> Keeper {
        init_logging();
        let registry = Arc::new(StaticRegistry::new(eligible.iter().copied()));
        let keys = Arc::new(StaticKeys::default());
        let pending = Arc::new(PendingSet::default());
        let logs = Arc::new(QueuedLogs::default());

        let coordinator = Arc::new(TransmissionCoordinator::new(
            config.coordinator,
            Arc::clone(&logs),
            Arc::new(DelimitedKeys),
        )
        .unwrap());
        let deps = collaborators(
            Arc::clone(&registry),
            Arc::clone(&keys),
            Arc::clone(&pending),
            Arc::new(CoordinatorFilter::new(Arc::clone(&coordinator))),
        );

        let (heads, head_rx) = mpsc::channel(4);
        let verifier = SamplingVerifier::new(config.verifier, deps, head_rx).unwrap();

        Keeper {
            verifier,
            coordinator,
            registry,
            keys,
            pending,
            logs,
            heads,
        }
    }

    /// Defaults, but every active key is sampled.
    fn full_sampling() -> KeeperConfig {
        let mut config = KeeperConfig::default();
        config.verifier.sample_ratio = 1.0;
        config
    }

    fn ids(observation: &Observation) -> BTreeSet<String> {
        observation
            .identifiers
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    async fn wait_for_block(verifier: &SamplingVerifier, block: u64) -> Observation {
        let block = BlockKey::from(block);
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let observation = verifier.observe();
            if observation.block == block {
                return observation;
            }
            assert!(Instant::now() < deadline, "round at {block} never completed");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_accepted_upkeeps_leave_rounds_until_confirmed() {
        let k = keeper(full_sampling(), &[3, 7, 11]);
        k.keys.set(keys_at(100, 0..30));
        k.verifier.start();

        k.heads.send(BlockKey::from(100)).await.unwrap();
        let observation = wait_for_block(&k.verifier, 100).await;
        assert_eq!(ids(&observation), set(&["11", "3", "7"]));

        // Reporting layer picks 3 and 7.
        let block = BlockKey::from(100);
        for id in ["3", "7"] {
            let key = UpkeepKey::new(&block, &UpkeepIdentifier::new(id));
            k.coordinator.accept(&key).unwrap();
            assert!(!k.coordinator.is_transmission_confirmed(&key));
        }
        assert_eq!(ids(&k.verifier.observe()), set(&["11"]));

        // The next round still finds them eligible but they stay filtered.
        k.keys.set(keys_at(101, 0..30));
        k.heads.send(BlockKey::from(101)).await.unwrap();
        let observation = wait_for_block(&k.verifier, 101).await;
        assert_eq!(ids(&observation), set(&["11"]));

        // A confirmed perform of 3 frees it; 7 stays locked.
        k.logs.push(UpkeepKey::from_raw("100|3"), 100, 1);
        assert_eq!(k.coordinator.poll_once().await.unwrap(), 1);
        assert!(k.coordinator.is_transmission_confirmed(&UpkeepKey::from_raw("100|3")));
        assert_eq!(ids(&k.verifier.observe()), set(&["11", "3"]));

        k.verifier.stop();
        k.coordinator.stop();
    }

    #[tokio::test]
    async fn test_pending_reports_are_hidden_from_observe() {
        let k = keeper(full_sampling(), &[1, 2]);
        k.keys.set(keys_at(200, 0..5));

        k.verifier.sample_round(BlockKey::from(200)).await.unwrap();
        k.pending.mark(UpkeepKey::from_raw("200|2"));
        assert_eq!(ids(&k.verifier.observe()), set(&["1"]));

        k.pending.clear();
        assert_eq!(ids(&k.verifier.observe()), set(&["1", "2"]));
    }

    #[tokio::test]
    async fn test_check_keys_reuses_round_results() {
        let k = keeper(full_sampling(), &[4]);
        let keys = keys_at(300, 0..20);
        k.keys.set(keys.clone());

        let summary = k.verifier.sample_round(BlockKey::from(300)).await.unwrap();
        assert_eq!(summary.sampled, 20);
        assert_eq!(summary.batches, 2);
        let calls = k.registry.calls();

        let results = k
            .verifier
            .check_keys(&CancelToken::never(), &keys[3..6])
            .await
            .unwrap();
        assert_eq!(k.registry.calls(), calls);
        assert!(results[1].is_eligible());
        assert_eq!(results[1].perform_data, b"4".to_vec());

        let fresh = keys_at(301, [4]);
        k.verifier
            .check_keys(&CancelToken::never(), &fresh)
            .await
            .unwrap();
        assert_eq!(k.registry.calls(), calls + 1);
    }

    #[tokio::test]
    async fn test_config_file_drives_wiring() {
        let config = KeeperConfig::parse(
            r#"
            [coordinator]
            min_confirmations = 3
            poll_cadence = "20ms"
            lockout_window = "1m"

            [verifier]
            batch_size = 4
            sample_ratio = 0.5

            [verifier.pool]
            max_workers = 2
            "#,
        )
        .unwrap();
        let k = keeper(config, &[]);
        k.keys.set(keys_at(400, 0..16));

        let summary = k.verifier.sample_round(BlockKey::from(400)).await.unwrap();
        assert_eq!(summary.sampled, 8);
        assert_eq!(summary.batches, 2);

        // Shallow logs leave the identifier locked under min_confirmations = 3.
        let key = UpkeepKey::from_raw("400|9");
        k.coordinator.accept(&key).unwrap();
        k.logs.push(key.clone(), 400, 2);
        k.coordinator.start();
        let deadline = Instant::now() + Duration::from_secs(2);
        while k.logs.polls() < 2 {
            assert!(Instant::now() < deadline, "poller never ran");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!k.coordinator.is_eligible(&key));
        assert_eq!(k.coordinator.lockout_window(), Duration::from_secs(60));

        k.coordinator.stop();
    }

    #[tokio::test]
    async fn test_stop_is_scoped_to_owner() {
        let k = keeper(full_sampling(), &[]);
        k.verifier.start();
        k.coordinator.start();

        drop(k.verifier);
        let deadline = Instant::now() + Duration::from_secs(2);
        while !k.heads.is_closed() {
            assert!(Instant::now() < deadline, "round loop outlived its verifier");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!k.coordinator.is_finished());

        k.coordinator.stop();
        let deadline = Instant::now() + Duration::from_secs(2);
        while !k.coordinator.is_finished() {
            assert!(Instant::now() < deadline, "poller still running");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
