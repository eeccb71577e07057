use criterion::{criterion_group, criterion_main, Criterion};
use miniscatter::geometry::{DetectorLayout, GeometryConfig, GeometryFit, RotatedFootprint};
use std::hint::black_box;

fn rotated_detector(angle_deg: f64) -> GeometryConfig {
    GeometryConfig {
        detector_angle: angle_deg.to_radians(),
        detector_rotated: true,
        detector_distance: 100.0,
        ..GeometryConfig::default()
    }
}

/// Geometry fitting runs once per setup; this keeps an eye on the containment check
fn bench_geometry_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_fit");

    group.bench_function("rotated_footprint", |b| {
        b.iter(|| RotatedFootprint::compute(black_box(30f64.to_radians()), black_box(1.0), black_box(100.0)));
    });

    let unrotated = GeometryConfig::default();
    group.bench_function("unrotated_fit", |b| {
        b.iter(|| GeometryFit::compute(black_box(&unrotated)));
    });

    let rotated = rotated_detector(30.0);
    group.bench_function("rotated_fit", |b| {
        b.iter(|| GeometryFit::compute(black_box(&rotated)));
    });

    group.bench_function("detector_layout", |b| {
        b.iter(|| DetectorLayout::build(black_box(rotated.clone())));
    });

    group.finish();
}

criterion_group!(geometry_benches, bench_geometry_fit);
criterion_main!(geometry_benches);
