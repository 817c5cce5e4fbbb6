use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waterfall_layout::{resolve_columns, BreakpointMatch, BreakpointTable, PlacementEngine};

fn heights(count: usize) -> Vec<f32> {
    (0..count).map(|i| 80.0 + ((i * 37) % 220) as f32).collect()
}

fn bench_placement(c: &mut Criterion) {
    let table = BreakpointTable::standard();
    let mut group = c.benchmark_group("placement_pass");

    for &count in &[10usize, 100, 1_000] {
        let items = heights(count);
        for &width in &[700.0f32, 1100.0, 1900.0] {
            let geometry = resolve_columns(Some(width), &table, BreakpointMatch::UpTo, 250.0, 20.0);
            let mut engine = PlacementEngine::new();
            group.bench_with_input(
                BenchmarkId::new(format!("{}px", width), count),
                &items,
                |b, items| b.iter(|| engine.place(&geometry, black_box(items), |h, _| *h)),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_placement);
criterion_main!(benches);
