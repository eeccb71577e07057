use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use miniscatter::beam::{
    BeamSampler, BeamSettings, CholeskyFactor, CovarianceMatrix2x2, ParticleSpecies, TwissParameters,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn proton_sampler(description: Option<&str>) -> BeamSampler {
    let settings = BeamSettings {
        particle: ParticleSpecies::find("proton").unwrap(),
        kinetic_energy: 200.0,
        offset: 0.0,
        z_start: -5.5,
    };
    BeamSampler::from_description(settings, description).unwrap()
}

/// Setup cost: covariance construction and decomposition
fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("covariance_setup");
    let twiss = TwissParameters::new(1.5, 8.0, -1.2);

    group.bench_function("cholesky_2x2", |b| {
        let cov = CovarianceMatrix2x2::from_twiss(&twiss, 1.3);
        b.iter(|| CholeskyFactor::decompose(black_box(&cov)));
    });

    group.bench_function("sampler_from_description", |b| {
        b.iter(|| proton_sampler(black_box(Some("1.5:8:-1.2::0.7:3:2.5"))));
    });

    group.finish();
}

/// Per-event cost of drawing primaries
fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("phase_space_sampling");
    let correlated = proton_sampler(Some("1.5:8:-1.2::0.7:3:2.5"));
    let on_axis = proton_sampler(None);

    group.bench_function("correlated_vertex", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| correlated.sample_vertex(black_box(&mut rng)));
    });

    group.bench_function("on_axis_vertex", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| on_axis.sample_vertex(black_box(&mut rng)));
    });

    for count in [1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("sample_many", count), &count, |b, &count| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| correlated.sample_many(&mut rng, black_box(count)));
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("sample_many_parallel", count), &count, |b, &count| {
            b.iter(|| correlated.sample_many_parallel(42, black_box(count), 4096));
        });
    }

    group.finish();
}

criterion_group!(sampler_benches, bench_decomposition, bench_sampling);
criterion_main!(sampler_benches);
