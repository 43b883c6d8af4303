//! Kolea Benchmarks
//!
//! Benchmarks for the Kolea cuckoo filter hot paths, implemented with the
//! Criterion framework for statistical analysis and regression detection.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, SamplingMode,
    Throughput,
};
use std::time::Duration;

use kolea_lib::data_structures::kolea_cuckoo_filter::{
    mix, KoleaCuckooFilter, KoleaCuckooFilterConfig, KoleaHasher, RecordingObserver,
};

fn seeded_filter() -> KoleaCuckooFilter {
    KoleaCuckooFilter::with_config(KoleaCuckooFilterConfig::new().with_seed(42))
        .expect("default configuration is valid")
}

fn filled_filter(size: i32) -> KoleaCuckooFilter {
    let mut filter = seeded_filter();
    for key in 0..size {
        filter.insert(key).expect("insert within resize budget");
    }
    filter
}

/// Benchmark hashing and candidate derivation
fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("kolea_hashing");
    let hasher = KoleaHasher::new(1024);

    group.bench_function("mix", |b| {
        let mut key = 0i32;
        b.iter(|| {
            key = key.wrapping_add(1);
            black_box(mix(black_box(key)))
        });
    });

    group.bench_function("candidates", |b| {
        let mut key = 0i32;
        b.iter(|| {
            key = key.wrapping_add(1);
            black_box(hasher.candidates(black_box(key)))
        });
    });

    group.finish();
}

/// Benchmark filter operations
fn bench_cuckoo_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("kolea_cuckoo_filter");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    // Sequential inserts including every resize they trigger
    for size in [100, 1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), size, |b, &size| {
            b.iter(|| black_box(filled_filter(size)));
        });
    }

    // Lookups of present and absent keys
    for size in [100, 1000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("lookup", size), size, |b, &size| {
            let filter = filled_filter(size);
            b.iter(|| {
                for key in 0..size * 2 {
                    black_box(filter.contains(key));
                }
            });
        });
    }

    // Deleting every key from a filled table
    group.bench_function("delete_all", |b| {
        b.iter_batched(
            || filled_filter(1000),
            |mut filter| {
                for key in 0..1000 {
                    black_box(filter.delete(key));
                }
            },
            BatchSize::SmallInput,
        );
    });

    // Report construction overhead with an observer attached
    group.bench_function("insert_with_observer", |b| {
        b.iter_batched(
            || seeded_filter().with_observer(Box::new(RecordingObserver::new())),
            |mut filter| {
                for key in 0..100 {
                    black_box(filter.insert(key).expect("insert within resize budget"));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_hashing, bench_cuckoo_filter);
criterion_main!(benches);
