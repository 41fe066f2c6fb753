//! Benchmarks for midpoint and distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rendezvous_geo::{haversine_distance, midpoint, Coordinate};

fn participants(count: usize) -> Vec<Coordinate> {
    (0..count)
        .map(|i| {
            // spread around Berlin
            let lat = 52.0 + (i as f64 * 0.01) % 1.0;
            let lng = 13.0 + (i as f64 * 0.013) % 1.0;
            Coordinate::new(lat, lng)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let berlin = Coordinate::new(52.5200, 13.4050);
    let potsdam = Coordinate::new(52.3906, 13.0645);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&berlin), black_box(&potsdam)))
    });
}

fn bench_midpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("midpoint");

    for size in [2, 8, 64, 1024].iter() {
        let points = participants(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| midpoint(black_box(&points)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_midpoint);
criterion_main!(benches);
