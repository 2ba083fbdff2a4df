//! Benchmarks for the SORT tracker

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sorttrack::{Bbox, Detection, Sort, SortConfig};
use std::hint::black_box;

fn create_test_detections(n_detections: usize, n_frames: usize) -> Vec<Vec<Detection>> {
    (0..n_frames)
        .map(|frame| {
            (0..n_detections)
                .map(|i| {
                    let x = (frame * 2 + i * 60) as f32;
                    let y = (frame + i * 40) as f32;
                    Detection::new(x, y, x + 50.0, y + 30.0, 0.8)
                })
                .collect()
        })
        .collect()
}

fn bench_sort_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_update");
    for &n in &[5usize, 20, 100] {
        let frames = create_test_detections(n, 10);
        group.bench_with_input(BenchmarkId::new("detections", n), &frames, |b, frames| {
            b.iter_batched(
                || Sort::new(SortConfig::default()).unwrap(),
                |mut tracker| {
                    for dets in frames {
                        black_box(tracker.update(black_box(dets)));
                    }
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_iou_calculation(c: &mut Criterion) {
    let detections: Vec<Bbox> = (0..50)
        .map(|i| Bbox::new(i as f32, i as f32, i as f32 + 40.0, i as f32 + 40.0))
        .collect();
    let tracks: Vec<Bbox> = (0..30)
        .map(|i| Bbox::new(i as f32 + 0.5, i as f32, i as f32 + 40.5, i as f32 + 40.0))
        .collect();

    c.bench_function("iou_calculation_50x30", |b| {
        b.iter(|| sorttrack::ious(black_box(&detections), black_box(&tracks)))
    });
}

criterion_group!(benches, bench_sort_update, bench_iou_calculation);
criterion_main!(benches);
