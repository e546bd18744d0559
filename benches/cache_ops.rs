//! Benchmark suite for tagcache operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tagcache::{unsync::Cache, CacheSetup};

fn populated(size: u64, tags_per_entry: u64, num_tags: u64) -> Cache<String> {
    let mut cache = Cache::builder().initial_capacity(size as usize).build();
    for i in 0..size {
        let tags = (0..tags_per_entry).map(|t| format!("tag-{}", (i + t) % num_tags));
        cache
            .add(
                CacheSetup::new(format!("key-{}", i))
                    .invalidators(tags)
                    .payload(format!("value-{}", i)),
            )
            .unwrap();
    }
    cache
}

/// Benchmark insertion of new entries into an empty cache.
///
/// Tests cache sizes: 100, 1,000, and 10,000 entries.
fn add_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for size in [100u64, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(populated(size, 2, 64)));
        });
    }
    group.finish();
}

/// Benchmark read operations on a pre-populated cache.
fn get_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for size in [100u64, 1000, 10000].iter() {
        let cache = populated(*size, 2, 64);
        let keys: Vec<String> = (0..*size).map(|i| format!("key-{}", i)).collect();

        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for key in &keys {
                    let _ = cache.get(black_box(key));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark invalidating every tag of a pre-populated cache, which evicts all
/// of its entries.
fn invalidate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("invalidate");

    for num_tags in [8u64, 64, 512].iter() {
        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_tags),
            num_tags,
            |b, &num_tags| {
                b.iter_batched(
                    || populated(10_000, 3, num_tags),
                    |mut cache| {
                        for t in 0..num_tags {
                            let _ = cache.invalidate(&format!("tag-{}", t));
                        }
                        cache
                    },
                    criterion::BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, add_benchmark, get_benchmark, invalidate_benchmark);
criterion_main!(benches);
