//! Benchmarks for compilation and the hot queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabledd_core::{BuildConfig, CompileMethod, Dimension, DimensionType, OrderingStrategy, Schema};
use tabledd_mdd::{Builder, Mdd, Pattern, Row};

fn schema() -> Schema {
    Schema::new(vec![
        Dimension::new("a", DimensionType::Categorical),
        Dimension::new("b", DimensionType::Categorical),
        Dimension::new("c", DimensionType::Categorical),
        Dimension::new("d", DimensionType::Categorical),
    ])
}

/// Deterministic synthetic table with heavy prefix sharing.
fn rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            Row::new()
                .with("a", format!("a{}", i % 4))
                .with("b", format!("b{}", i % 7))
                .with("c", format!("c{}", i % 3))
                .with("d", format!("d{}", i % 11))
        })
        .collect()
}

fn build(n: usize, method: CompileMethod) -> Mdd {
    Builder::new(schema())
        .with_config(BuildConfig {
            ordering: OrderingStrategy::Fixed,
            compilation_method: method,
            ..BuildConfig::default()
        })
        .fit(&rows(n))
        .unwrap()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for n in [100, 1_000, 10_000] {
        let data = rows(n);
        let builder = Builder::new(schema()).with_config(BuildConfig {
            ordering: OrderingStrategy::Fixed,
            ..BuildConfig::default()
        });
        group.bench_with_input(BenchmarkId::new("trie", n), &data, |b, data| {
            b.iter(|| black_box(builder.fit(data).unwrap().size()));
        });
        let slice_builder = Builder::new(schema()).with_config(BuildConfig {
            ordering: OrderingStrategy::Fixed,
            compilation_method: CompileMethod::Slice,
            ..BuildConfig::default()
        });
        group.bench_with_input(BenchmarkId::new("slice", n), &data, |b, data| {
            b.iter(|| black_box(slice_builder.fit(data).unwrap().size()));
        });
    }
    group.finish();
}

fn bench_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("count");
    for n in [1_000, 10_000] {
        let mdd = build(n, CompileMethod::Trie);
        let mut pattern = Pattern::new();
        pattern.insert("b".to_string(), "b3".into());
        group.bench_with_input(BenchmarkId::new("pattern", n), &mdd, |b, mdd| {
            b.iter(|| black_box(mdd.count(&pattern).unwrap()));
        });
    }
    group.finish();
}

fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete");
    let mdd = build(10_000, CompileMethod::Trie);
    let mut pattern = Pattern::new();
    pattern.insert("a".to_string(), "a1".into());
    for beam in [5, 25, 100] {
        group.bench_with_input(BenchmarkId::new("beam", beam), &beam, |b, &beam| {
            b.iter(|| black_box(mdd.complete(&pattern, 5, beam).unwrap().len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_count, bench_complete);
criterion_main!(benches);
