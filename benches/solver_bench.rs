//! Solver benchmarks.
//!
//! Measures the oracle and the record transforms on records of growing
//! width, plus distribution over wide unions. Set `TYREL_LOG` to trace a
//! run.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tyrel::{DeepRule, Engine, KeyRemap, TypeId};

fn wide_record(engine: &Engine, width: usize) -> TypeId {
    let attributes = (0..width)
        .map(|i| {
            let value = if i % 2 == 0 { TypeId::NUMBER } else { TypeId::STRING };
            engine.attribute(&format!("field{i}"), value)
        })
        .collect();
    engine.record(attributes).unwrap_or(TypeId::ERROR)
}

fn nested_record(engine: &Engine, depth: usize) -> TypeId {
    let mut current = engine
        .record(vec![engine.attribute("leaf", TypeId::NUMBER)])
        .unwrap_or(TypeId::ERROR);
    for _ in 0..depth {
        current = engine
            .record(vec![
                engine.attribute("next", current),
                engine.attribute("tag", TypeId::STRING),
            ])
            .unwrap_or(TypeId::ERROR);
    }
    current
}

fn bench_equal(c: &mut Criterion) {
    tyrel::tracing_config::init_tracing();
    let mut group = c.benchmark_group("equal");
    for width in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("record", width), &width, |b, &width| {
            b.iter(|| {
                let engine = Engine::new();
                let left = wide_record(&engine, width);
                let right = engine.readonly(left, true).unwrap_or(TypeId::ERROR);
                black_box(engine.equal(left, right))
            });
        });
    }
    group.finish();
}

fn bench_transforms(c: &mut Criterion) {
    tyrel::tracing_config::init_tracing();
    let mut group = c.benchmark_group("transforms");
    for width in [8, 32, 128] {
        group.bench_with_input(BenchmarkId::new("pick_half", width), &width, |b, &width| {
            b.iter(|| {
                let engine = Engine::new();
                let source = wide_record(&engine, width);
                let names: Vec<String> = (0..width / 2).map(|i| format!("field{i}")).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                black_box(engine.pick(source, engine.keys(&refs)))
            });
        });
        group.bench_with_input(BenchmarkId::new("getter_rename", width), &width, |b, &width| {
            b.iter(|| {
                let engine = Engine::new();
                let source = wide_record(&engine, width);
                let remap = KeyRemap::getter(engine.interner());
                black_box(engine.rename_filter(source, &remap))
            });
        });
    }
    for depth in [4, 16, 32] {
        group.bench_with_input(BenchmarkId::new("deep_readonly", depth), &depth, |b, &depth| {
            b.iter(|| {
                let engine = Engine::new();
                let source = nested_record(&engine, depth);
                black_box(engine.deep_transform(source, DeepRule::Readonly(true)))
            });
        });
    }
    group.finish();
}

fn bench_distribution(c: &mut Criterion) {
    tyrel::tracing_config::init_tracing();
    let mut group = c.benchmark_group("distribution");
    for members in [8, 64, 256] {
        group.bench_with_input(BenchmarkId::new("exclude", members), &members, |b, &members| {
            b.iter(|| {
                let engine = Engine::new();
                let names: Vec<String> = (0..members).map(|i| format!("m{i}")).collect();
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                let union = engine.keys(&refs);
                black_box(engine.exclude(union, engine.literal("m0")))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_equal, bench_transforms, bench_distribution);
criterion_main!(benches);
