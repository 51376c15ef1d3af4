//! Benchmarks for plan evaluation with the local engine.
//!
//! Measures rows-per-second throughput across row counts and partition
//! counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use synthplan_core::LocalEngine;
use synthplan_testutil::{orders_builder, ArithmeticEvaluator};

fn bench_row_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate/row_count");
    let engine = LocalEngine::with_evaluator(ArithmeticEvaluator);

    for rows in [1_000u64, 10_000, 100_000] {
        let plan = orders_builder(rows, 8).build().unwrap();
        group.throughput(Throughput::Elements(rows));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, _| {
            b.iter(|| engine.evaluate(&plan).unwrap());
        });
    }
    group.finish();
}

fn bench_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate/partitions");
    let rows = 50_000u64;
    let plan = orders_builder(rows, 1).build().unwrap();

    for partitions in [1usize, 4, 16] {
        let engine = LocalEngine::with_evaluator(ArithmeticEvaluator).with_partitions(partitions);
        group.throughput(Throughput::Elements(rows));
        group.bench_with_input(
            BenchmarkId::new("partitions", partitions),
            &partitions,
            |b, _| {
                b.iter(|| engine.evaluate(&plan).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_row_count, bench_partitions);
criterion_main!(benches);
