//! Timeline partition benchmarks for tp_core.
//!
//! Run with: `cargo bench -p tp_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tp_core::timeline::{FragmentOpts, TimeFragment};

/// Stacked ranges: a full base layer, then shrinking windows painted on top.
fn layered_ranges(count: usize, duration: f64) -> Vec<[f64; 2]> {
    let step = duration / (count as f64 * 2.0);
    let mut ranges = vec![[0.0, duration]];
    for idx in 1..count {
        let inset = step * idx as f64;
        ranges.push([inset, duration - inset]);
    }
    ranges
}

/// Adjacent ranges that tile the timeline without overlap.
fn tiled_ranges(count: usize, duration: f64) -> Vec<[f64; 2]> {
    let step = duration / count as f64;
    (0..count)
        .map(|idx| [step * idx as f64, step * (idx + 1) as f64])
        .collect()
}

/// Runs partition benchmarks over layered and tiled inputs.
pub fn partition_benchmark(c: &mut Criterion) {
    let duration = 8.0;
    let opts = FragmentOpts::new(duration);
    let mut group = c.benchmark_group("partition");
    for count in [4_usize, 32, 256] {
        let layered = layered_ranges(count, duration);
        group.bench_with_input(BenchmarkId::new("layered", count), &layered, |b, ranges| {
            b.iter(|| TimeFragment::partition(black_box(ranges), "bench", &opts));
        });
        let tiled = tiled_ranges(count, duration);
        group.bench_with_input(BenchmarkId::new("tiled", count), &tiled, |b, ranges| {
            b.iter(|| TimeFragment::partition(black_box(ranges), "bench", &opts));
        });
    }
    group.finish();
}

criterion_group!(benches, partition_benchmark);
criterion_main!(benches);
