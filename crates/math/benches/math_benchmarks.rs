//! Benchmarks for hanover-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hanover_math::{
    assign_buckets, breakpoints, equal_quantiles, weighted_breakpoints, weighted_mean_available,
};
use hanover_primitives::TieBreak;
use ndarray::Array1;
use rand::Rng;

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 1000.0))
}

fn bench_breakpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("breakpoints");
    let targets = equal_quantiles(10);

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let values = random_array(size);
            b.iter(|| breakpoints(black_box(&values), black_box(&targets)).unwrap());
        });
    }

    group.finish();
}

fn bench_weighted_breakpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_breakpoints");
    let targets = equal_quantiles(10);

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let values = random_array(size);
            let weights = random_array(size);
            b.iter(|| {
                weighted_breakpoints(black_box(&values), black_box(&weights), black_box(&targets))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_assign_buckets(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_buckets");
    let targets = equal_quantiles(10);

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let values = random_array(size);
            let cuts = breakpoints(&values, &targets).unwrap();
            b.iter(|| assign_buckets(black_box(&values), black_box(&cuts), TieBreak::Lower));
        });
    }

    group.finish();
}

fn bench_weighted_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted_mean_available");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let values: Vec<Option<f64>> = random_array(size).iter().map(|&v| Some(v)).collect();
            let weights = random_array(size);
            b.iter(|| weighted_mean_available(black_box(&values), black_box(&weights)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_breakpoints,
    bench_weighted_breakpoints,
    bench_assign_buckets,
    bench_weighted_mean
);
criterion_main!(benches);
