//! Head-to-head comparison of every cache variant.
//!
//! All variants run through the builder's [`Cache`] wrapper so dispatch cost
//! is identical and only the eviction strategy differs.

mod common;

use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use common::workload::{KeyStream, Workload, run_hit_rate};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lrukit::builder::{Cache, CacheBuilder, CachePolicy};

const CAPACITY: usize = 4096;
const UNIVERSE: u64 = 16_384;
const OPS: u64 = 100_000;

fn variants() -> Vec<(&'static str, CachePolicy)> {
    vec![
        ("clock", CachePolicy::Clock),
        ("generational", CachePolicy::Generational),
        #[cfg(feature = "concurrency")]
        ("concurrent_generational", CachePolicy::ConcurrentGenerational),
        ("access_ordered", CachePolicy::AccessOrdered),
    ]
}

fn build<V: Clone>(policy: CachePolicy) -> Cache<u64, V> {
    CacheBuilder::new(CAPACITY).build(policy).unwrap()
}

// =============================================================================
// Get (cache hit)
// =============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_get_hit");
    group.throughput(Throughput::Elements(OPS));

    // Stay under a third of capacity so generational variants never rotate.
    let resident = (CAPACITY / 4) as u64;
    for (name, policy) in variants() {
        group.bench_function(name, |b| {
            b.iter_custom(|iters| {
                let mut cache = build::<u64>(policy);
                for key in 0..resident {
                    cache.put(key, key);
                }
                let start = Instant::now();
                for _ in 0..iters {
                    for i in 0..OPS {
                        black_box(cache.get(&(i % resident)));
                    }
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

// =============================================================================
// Insert churn (every put evicts)
// =============================================================================

fn bench_insert_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_insert_churn");
    group.throughput(Throughput::Elements(OPS));

    for (name, policy) in variants() {
        group.bench_function(name, |b| {
            b.iter_custom(|iters| {
                let mut cache = build::<u64>(policy);
                let start = Instant::now();
                for round in 0..iters {
                    for i in 0..OPS {
                        let key = round * OPS + i;
                        black_box(cache.put(key, key));
                    }
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

// =============================================================================
// Workload hit rates
// =============================================================================

fn bench_workloads(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_workloads");
    group.throughput(Throughput::Elements(OPS));

    for (workload_name, workload) in Workload::standard() {
        let keys = KeyStream::new(UNIVERSE, workload, 0xcafe).take_keys(OPS as usize);
        for (name, policy) in variants() {
            group.bench_with_input(
                BenchmarkId::new(name, workload_name),
                &keys,
                |b, keys| {
                    b.iter_custom(|iters| {
                        let start = Instant::now();
                        for _ in 0..iters {
                            let mut cache = build::<Arc<u64>>(policy);
                            black_box(run_hit_rate(&mut cache, keys, Arc::new));
                        }
                        start.elapsed()
                    })
                },
            );

            let mut cache = build::<Arc<u64>>(policy);
            let rate = run_hit_rate(&mut cache, &keys, Arc::new);
            println!(
                "{name:>24} {workload_name:<14} hit rate {:.2}%",
                rate.ratio() * 100.0
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_insert_churn, bench_workloads);
criterion_main!(benches);
