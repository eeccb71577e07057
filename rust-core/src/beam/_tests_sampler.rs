#[cfg(test)]
mod tests {
    use super::super::particles::ParticleSpecies;
    use super::super::sampler::{BeamSampler, BeamSettings, PhaseSpaceSample};
    use crate::error::MiniScatterError;
    use crate::interfaces::Plane;
    use approx::assert_relative_eq;
    use nalgebra::Matrix2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn proton_settings(offset: f64) -> BeamSettings {
        BeamSettings {
            particle: ParticleSpecies::find("proton").unwrap(),
            kinetic_energy: 200.0,
            offset,
            z_start: -15.0,
        }
    }

    fn sample_covariance(samples: &[PhaseSpaceSample], plane: Plane) -> (Matrix2<f64>, f64) {
        let n = samples.len() as f64;
        let (mut su, mut sup) = (0.0, 0.0);
        for s in samples {
            let (u, up) = s.plane(plane);
            su += u;
            sup += up;
        }
        let (mu, mup) = (su / n, sup / n);
        let (mut uu, mut uup, mut upup) = (0.0, 0.0, 0.0);
        for s in samples {
            let (u, up) = s.plane(plane);
            uu += (u - mu) * (u - mu);
            uup += (u - mu) * (up - mup);
            upup += (up - mup) * (up - mup);
        }
        (Matrix2::new(uu / n, uup / n, uup / n, upup / n), mup)
    }

    fn assert_covariance_close(sampled: &Matrix2<f64>, target: &Matrix2<f64>, rel: f64) {
        assert_relative_eq!(sampled[(0, 0)], target[(0, 0)], max_relative = rel);
        assert_relative_eq!(sampled[(1, 1)], target[(1, 1)], max_relative = rel);
        // Off-diagonal compared on the scale of the standard deviations
        let scale = (target[(0, 0)] * target[(1, 1)]).sqrt();
        assert!(
            (sampled[(0, 1)] - target[(0, 1)]).abs() < rel * scale,
            "correlation {:e} vs {:e}",
            sampled[(0, 1)],
            target[(0, 1)]
        );
    }

    #[test]
    fn test_sample_covariance_converges() {
        let sampler =
            BeamSampler::from_description(proton_settings(0.0), Some("1.5:8:-1.2::0.7:3:2.5")).unwrap();
        let beam = *sampler.correlated().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let samples = sampler.sample_many(&mut rng, 200_000);

        let (cov_x, _) = sample_covariance(&samples, Plane::X);
        let (cov_y, _) = sample_covariance(&samples, Plane::Y);
        assert_covariance_close(&cov_x, beam.covariance.x.matrix(), 0.02);
        assert_covariance_close(&cov_y, beam.covariance.y.matrix(), 0.02);
    }

    #[test]
    fn test_planes_are_independent() {
        let sampler = BeamSampler::from_description(proton_settings(0.0), Some("1:2:0.5")).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let samples = sampler.sample_many(&mut rng, 100_000);

        let n = samples.len() as f64;
        let sx = samples.iter().map(|s| s.x * s.x).sum::<f64>() / n;
        let sy = samples.iter().map(|s| s.y * s.y).sum::<f64>() / n;
        let sxy = samples.iter().map(|s| s.x * s.y).sum::<f64>() / n;
        assert!(sxy.abs() / (sx * sy).sqrt() < 0.02);
    }

    #[test]
    fn test_offset_shifts_divergence_mean() {
        let sampler = BeamSampler::from_description(proton_settings(0.25), Some("1:2:0")).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let samples = sampler.sample_many(&mut rng, 50_000);
        let (_, mean_xp) = sample_covariance(&samples, Plane::X);
        assert_relative_eq!(mean_xp, 0.25, epsilon = 1e-4);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let sampler = BeamSampler::from_description(proton_settings(0.0), Some("2:5:1")).unwrap();
        let a = sampler.sample_many(&mut StdRng::seed_from_u64(11), 100);
        let b = sampler.sample_many(&mut StdRng::seed_from_u64(11), 100);
        let c = sampler.sample_many(&mut StdRng::seed_from_u64(12), 100);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_on_axis_fallback() {
        let sampler = BeamSampler::from_description(proton_settings(2.0), None).unwrap();
        assert!(!sampler.has_covariance());

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let vertex = sampler.sample_vertex(&mut rng);
            assert_relative_eq!(vertex.position.x, 2.0, epsilon = 1e-12);
            assert_eq!(vertex.position.y, 0.0);
            assert_eq!(vertex.position.z, -15.0);
            assert_eq!(vertex.direction, nalgebra::Vector3::z());
            assert_eq!(vertex.pdg, 2212);
            assert_eq!(vertex.kinetic_energy, 200.0);
        }

        // Blank descriptions behave like a missing one
        let blank = BeamSampler::from_description(proton_settings(0.0), Some("  ")).unwrap();
        assert!(!blank.has_covariance());
    }

    #[test]
    fn test_vertex_units_and_direction() {
        let sampler = BeamSampler::from_description(proton_settings(0.0), Some("1:2:0")).unwrap();
        let sample = PhaseSpaceSample { x: 1e-3, xp: 2e-3, y: -3e-3, yp: 0.0 };
        let vertex = sampler.vertex_from(sample);

        assert_relative_eq!(vertex.position.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(vertex.position.y, -3.0, epsilon = 1e-12);
        assert_relative_eq!(vertex.direction.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(vertex.direction.x / vertex.direction.z, 2e-3, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_description_is_parse_error() {
        let err = BeamSampler::from_description(proton_settings(0.0), Some("1:abc:0")).unwrap_err();
        match err {
            MiniScatterError::Parse { field, raw, .. } => {
                assert_eq!(field, "beta");
                assert_eq!(raw, "abc");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_massless_beam_with_twiss_is_rejected() {
        let settings = BeamSettings {
            particle: ParticleSpecies::find("gamma").unwrap(),
            ..proton_settings(0.0)
        };
        let err = BeamSampler::from_description(settings, Some("1:2:0")).unwrap_err();
        assert!(matches!(err, MiniScatterError::Configuration(_)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_sampling_is_reproducible() {
        let sampler = BeamSampler::from_description(proton_settings(0.0), Some("1:2:-0.5")).unwrap();
        let a = sampler.sample_many_parallel(99, 10_001, 1000);
        let b = sampler.sample_many_parallel(99, 10_001, 1000);
        assert_eq!(a.len(), 10_001);
        assert_eq!(a, b);
    }
}
