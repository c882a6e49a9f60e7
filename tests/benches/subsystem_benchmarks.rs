//! # Keeper-Chain Subsystem Benchmarks
//!
//! | Subsystem | Path | Target |
//! |-----------|------|--------|
//! | kc-01 Expiring Cache | get / set under read lock | < 1µs |
//! | kc-01 Expiring Cache | sweep of 10k entries | < 5ms |
//! | kc-04 Sampling Verifier | `check_keys` served from cache | < 50µs per 100 keys |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use kc_01_expiring_cache::{ExpiringCache, DEFAULT_EXPIRATION};
use kc_04_sampling_verifier::{FnFilter, SamplingVerifier, VerifierApi, VerifierConfig};
use kc_tests::fixtures::{collaborators, keys_at, PendingSet, StaticKeys, StaticRegistry};
use shared_types::{BlockKey, CancelToken, UpkeepKey};

// ============================================================================
// KC-01: Expiring Cache
// ============================================================================

fn bench_cache_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let _guard = rt.enter();

    let mut group = c.benchmark_group("kc-01-expiring-cache");
    group.measurement_time(Duration::from_secs(5));

    let cache: ExpiringCache<UpkeepKey, u64> = ExpiringCache::new(Duration::from_secs(600));
    let keys = keys_at(1, 0..10_000);
    for (i, key) in keys.iter().enumerate() {
        cache.set(key.clone(), i as u64, DEFAULT_EXPIRATION);
    }

    group.bench_function("get_hit", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(cache.get(&keys[i]))
        })
    });

    let missing = UpkeepKey::from_raw("1|absent");
    group.bench_function("get_miss", |b| b.iter(|| black_box(cache.get(&missing))));

    group.bench_function("set_default", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % keys.len();
            cache.set_default(keys[i].clone(), i as u64)
        })
    });

    for size in [1_000usize, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("clear_expired", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let sweep: ExpiringCache<UpkeepKey, u64> = ExpiringCache::new(DEFAULT_EXPIRATION);
                    for (i, key) in keys.iter().take(size).enumerate() {
                        // Every other entry is already past its deadline.
                        let ttl = if i % 2 == 0 {
                            Duration::from_nanos(1)
                        } else {
                            Duration::from_secs(600)
                        };
                        sweep.set(key.clone(), i as u64, ttl);
                    }
                    std::thread::sleep(Duration::from_micros(10));
                    sweep
                },
                |sweep| black_box(sweep.clear_expired()),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// KC-04: Sampling Verifier
// ============================================================================

fn bench_check_keys_hit_path(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("kc-04-sampling-verifier");
    group.measurement_time(Duration::from_secs(5));

    let registry = Arc::new(StaticRegistry::new((0..1_000).step_by(7)));
    let active = Arc::new(StaticKeys::default());
    let keys = keys_at(500, 0..1_000);
    active.set(keys.clone());

    let verifier = rt.block_on(async {
        let deps = collaborators(
            Arc::clone(&registry),
            active,
            Arc::new(PendingSet::default()),
            Arc::new(FnFilter(|_: &UpkeepKey| true)),
        );
        let (_heads, head_rx) = mpsc::channel(1);
        let config = VerifierConfig {
            sample_ratio: 1.0,
            ..VerifierConfig::default()
        };
        let verifier = SamplingVerifier::new(config, deps, head_rx).unwrap();
        verifier.sample_round(BlockKey::from(500)).await.unwrap();
        verifier
    });
    let cancel = CancelToken::never();

    for size in [10usize, 100] {
        let request: Vec<_> = keys.iter().take(size).cloned().collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("check_keys_cached", size), &request, |b, request| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(verifier.check_keys(&cancel, request).await.unwrap())
                })
            })
        });
    }

    group.bench_function("observe", |b| b.iter(|| black_box(verifier.observe())));

    group.finish();
    rt.block_on(async { verifier.stop() });
}

criterion_group!(benches, bench_cache_operations, bench_check_keys_hit_path);

criterion_main!(benches);
