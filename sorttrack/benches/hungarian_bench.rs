use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::prelude::*;
use sorttrack::hungarian::HungarianSolver;

/// IoU-like weights: mostly zero with a sprinkling of overlaps
fn generate_random_weights(rows: usize, cols: usize, density: f64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(42);
    Array2::from_shape_fn((rows, cols), |_| {
        if rng.gen_bool(density) {
            rng.gen_range(0.3..1.0)
        } else {
            0.0
        }
    })
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian_maximize");
    for &size in &[10usize, 50, 100] {
        let weights = generate_random_weights(size, size, 0.1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &weights, |b, w| {
            b.iter(|| HungarianSolver::maximize(black_box(w.view())))
        });
    }
    group.finish();
}

fn bench_hungarian_rectangular(c: &mut Criterion) {
    let weights = generate_random_weights(80, 30, 0.2);

    c.bench_function("hungarian_maximize_80x30", |b| {
        b.iter(|| HungarianSolver::maximize(black_box(weights.view())))
    });
}

criterion_group!(benches, bench_hungarian, bench_hungarian_rectangular);
criterion_main!(benches);
