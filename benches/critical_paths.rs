//! Criterion benchmarks for unity-build critical paths
//!
//! Benchmarks the operations that run once per target:
//! - Flatten: Nested source lists to sources and passthrough inputs
//! - Partition: Slicing sources into aggregate groups
//! - Render: Building aggregate file contents

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::{Path, PathBuf};
use unity_build::build::{flatten, render_aggregate, Partitioner, SourceItem};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate n source paths spread over a few directories
fn make_sources(n: usize) -> Vec<PathBuf> {
    (0..n).map(|i| PathBuf::from(format!("/project/src/mod{}/file{:05}.cpp", i % 8, i))).collect()
}

/// Generate a nested source list with one object file every ten entries
fn make_nested(n: usize) -> Vec<SourceItem> {
    let chunks = make_sources(n);
    chunks
        .chunks(10)
        .enumerate()
        .map(|(i, chunk)| {
            let mut items: Vec<SourceItem> = chunk.iter().cloned().map(SourceItem::Source).collect();
            items.push(SourceItem::node(format!("/project/lib/prebuilt{}.o", i)));
            SourceItem::list(items)
        })
        .collect()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for size in [100, 1_000, 10_000].iter() {
        let items = make_nested(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("nested", size), &items, |b, items| {
            b.iter(|| flatten(black_box(items)))
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    let partitioner = Partitioner::new(15, 8, "/project/build/unity");

    for size in [100, 1_000, 10_000].iter() {
        let sources = make_sources(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("groups", size), &sources, |b, sources| {
            b.iter(|| partitioner.partition(black_box(sources), Path::new("/project/bin/app")))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [15, 150, 1_500].iter() {
        let sources = make_sources(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", size), &sources, |b, sources| {
            b.iter(|| render_aggregate(black_box(sources)))
        });
    }

    // Windows paths need every backslash doubled
    let windows: Vec<PathBuf> =
        (0..150).map(|i| PathBuf::from(format!("C:\\project\\src\\file{}.cpp", i))).collect();
    group.bench_function("aggregate_escaped", |b| b.iter(|| render_aggregate(black_box(&windows))));

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_flatten, bench_partition, bench_render);

criterion_main!(benches);
