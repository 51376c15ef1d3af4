//! Benchmarks for plan compilation: validation, dependency resolution and
//! expression synthesis.
//!
//! Compilation cost grows with the number of declarations and the depth of
//! their dependency chains, never with the row count.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use synthplan_core::{ColumnOptions, DataType, PlanBuilder};
use synthplan_testutil::orders_builder;

/// `n` independent random columns.
fn wide_builder(n: usize) -> PlanBuilder {
    let mut builder = PlanBuilder::new(1_000_000, 8, "wide");
    for i in 0..n {
        builder = builder
            .with_column(
                &format!("c{}", i),
                DataType::Long,
                ColumnOptions::new().range(0, 1_000, 1).random(true),
            )
            .unwrap();
    }
    builder
}

/// A chain `c0 <- c1 <- ... <- c{n-1}`, declared in reverse so every
/// reference is a forward reference.
fn chain_builder(n: usize) -> PlanBuilder {
    let mut builder = PlanBuilder::new(1_000_000, 8, "chain");
    for i in (0..n).rev() {
        let options = if i == 0 {
            ColumnOptions::new().range(0, 100, 1)
        } else {
            ColumnOptions::new().base_column(&format!("c{}", i - 1)).min(1)
        };
        builder = builder
            .with_column(&format!("c{}", i), DataType::Long, options)
            .unwrap();
    }
    builder
}

fn bench_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/wide");
    for n in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("columns", n), &n, |b, &n| {
            let builder = wide_builder(n);
            b.iter(|| builder.clone().build().unwrap());
        });
    }
    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/chain");
    for n in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("depth", n), &n, |b, &n| {
            let builder = chain_builder(n);
            b.iter(|| builder.clone().build().unwrap());
        });
    }
    group.finish();
}

fn bench_orders(c: &mut Criterion) {
    c.bench_function("compile/orders", |b| {
        let builder = orders_builder(1_000_000, 8);
        b.iter(|| builder.clone().build().unwrap());
    });
}

criterion_group!(benches, bench_wide, bench_chain, bench_orders);
criterion_main!(benches);
