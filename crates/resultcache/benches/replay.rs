//! Benchmarks for the caching cursor hot paths
//!
//! Measures step-wise fetch + save, bulk fetch, and cache-hit replay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use resultcache::{
    CacheKeys, CacheStore, CachingCursor, FetchShape, InMemoryCache, QueryCacheProfile,
    ReplayCursor, Row, Value, execute_cached,
};

fn create_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::from_pairs([
                ("ID", Value::from(i as i64)),
                ("NAME", Value::from(format!("name_{i}"))),
                ("SCORE", Value::from(i as f64 * 0.5)),
            ])
        })
        .collect()
}

fn bench_step_fetch(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_fetch_and_save");

    for count in [10, 100, 1000] {
        let rows = create_rows(count);
        group.throughput(Throughput::Elements(count as u64));

        for shape in [FetchShape::Associative, FetchShape::Indexed, FetchShape::Mixed] {
            group.bench_with_input(BenchmarkId::new(shape.as_str(), count), &rows, |b, rows| {
                b.iter(|| {
                    let cache = InMemoryCache::new();
                    let mut cursor = CachingCursor::new(
                        ReplayCursor::new(rows.clone()),
                        &cache,
                        "Q",
                        "Q#p1",
                        60,
                    );
                    while let Ok(Some(row)) = cursor.fetch_step(shape) {
                        black_box(row);
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_fetch_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch_all");

    for count in [100, 1000] {
        let rows = create_rows(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| {
                let cache = InMemoryCache::new();
                let mut cursor =
                    CachingCursor::new(ReplayCursor::new(rows.clone()), &cache, "Q", "Q#p1", 60);
                black_box(cursor.fetch_all(FetchShape::Associative))
            });
        });
    }

    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit_replay");
    let profile = QueryCacheProfile::new().with_lifetime(300).with_cache_key("Q");

    for siblings in [1, 50] {
        let cache = InMemoryCache::new();
        for i in 0..siblings {
            let mut cursor = CachingCursor::new(
                ReplayCursor::new(create_rows(100)),
                &cache,
                "Q",
                format!("Q#p{i}"),
                300,
            );
            let _ = cursor.fetch_all(FetchShape::Associative);
        }
        let stored = cache.get("Q").ok().flatten().map_or(0, |v| v.len());
        group.throughput(Throughput::Bytes(stored as u64));

        group.bench_with_input(BenchmarkId::from_parameter(siblings), &cache, |b, cache| {
            b.iter(|| {
                let cursor = execute_cached(cache, &profile, CacheKeys::new("Q", "Q#p0"), || {
                    Ok(ReplayCursor::new(Vec::new()))
                });
                black_box(cursor.map(|c| c.is_cached()))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step_fetch, bench_fetch_all, bench_cache_hit);
criterion_main!(benches);
