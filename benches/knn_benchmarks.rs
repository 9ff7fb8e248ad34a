//! Benchmarks for index construction and kNN queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use subspace_knn::{
    DistanceMetric, IndexConfig, KdTreeIndex, KnnIndex, KnnPcaPreprocessor, KnnQuery,
    LinearScanIndex, Point, SplitStrategy,
};

fn random_points(n: usize, dims: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|id| Point::new(id as u64, (0..dims).map(|_| rng.gen_range(-100.0..100.0)).collect()))
        .collect()
}

/// Benchmark KD-tree construction
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    group.measurement_time(Duration::from_secs(10));

    for &n in &[1_000usize, 10_000] {
        let points = random_points(n, 4, 1);
        group.throughput(Throughput::Elements(n as u64));
        for strategy in [SplitStrategy::Cycle, SplitStrategy::MaxSpread] {
            let config = IndexConfig { split_strategy: strategy, ..IndexConfig::default() };
            group.bench_with_input(BenchmarkId::new(format!("{:?}", strategy), n), &points, |b, points| {
                b.iter(|| {
                    black_box(KdTreeIndex::build(points.clone(), DistanceMetric::Euclidean, &config).unwrap())
                });
            });
        }
    }

    group.finish();
}

/// Benchmark pruned search against a linear scan
fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_query");
    let points = random_points(10_000, 4, 2);
    let queries = random_points(100, 4, 3);
    group.throughput(Throughput::Elements(queries.len() as u64));

    let tree = KdTreeIndex::build(points.clone(), DistanceMetric::Euclidean, &IndexConfig::default()).unwrap();
    let linear = LinearScanIndex::build(points, DistanceMetric::Euclidean).unwrap();

    for &k in &[1usize, 10, 50] {
        group.bench_with_input(BenchmarkId::new("kdtree", k), &k, |b, &k| {
            b.iter(|| {
                for q in &queries {
                    black_box(tree.k_nearest(KnnQuery::Point(q), k).unwrap());
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("linear_scan", k), &k, |b, &k| {
            b.iter(|| {
                for q in &queries {
                    black_box(linear.k_nearest(KnnQuery::Point(q), k).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark the local PCA preprocessing pass
fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca_preprocessing");
    group.sample_size(10);
    let points = random_points(2_000, 5, 4);
    let index = KdTreeIndex::build(points, DistanceMetric::Euclidean, &IndexConfig::default()).unwrap();
    let preprocessor = KnnPcaPreprocessor::new(20, 0.85).unwrap();

    group.bench_function("knn_pca_k20", |b| {
        b.iter(|| black_box(preprocessor.run(&index).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_preprocessing);
criterion_main!(benches);
