#[cfg(test)]
mod tests {
    use super::super::twiss_estimator::{TwissEstimate, TwissEstimator};
    use crate::beam::particles::ParticleSpecies;
    use crate::beam::sampler::{BeamSampler, BeamSettings};
    use crate::beam::twiss::TwissParameters;
    use crate::interfaces::Plane;
    use approx::assert_relative_eq;
    use nalgebra::Matrix2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_estimate_from_known_points() {
        let mut estimator = TwissEstimator::new();
        for (x, xp) in [(1e-3, 0.0), (-1e-3, 0.0), (0.0, 1e-3), (0.0, -1e-3)] {
            estimator.push(x, xp);
        }
        assert_eq!(estimator.count(), 4);

        let estimate = estimator.estimate().unwrap();
        assert_relative_eq!(estimate.eps_g, 0.5, max_relative = 1e-12);
        assert_relative_eq!(estimate.beta, 1.0, max_relative = 1e-12);
        assert_relative_eq!(estimate.alpha, 0.0, epsilon = 1e-12);
        assert_eq!(estimate.samples, 4);
    }

    #[test]
    fn test_degenerate_distributions() {
        let mut estimator = TwissEstimator::new();
        assert!(estimator.estimate().is_none());

        // A pencil beam has no emittance
        for _ in 0..10 {
            estimator.push(2e-3, 0.0);
        }
        assert!(estimator.covariance().is_some());
        assert!(estimator.estimate().is_none());

        // Perfectly correlated points have zero determinant
        assert!(TwissEstimate::from_covariance(&Matrix2::new(1.0, 1.0, 1.0, 1.0), 2).is_none());
    }

    #[test]
    fn test_inverse_of_covariance_construction() {
        let twiss = TwissParameters::new(1.0, 3.0, -0.8);
        let cov = crate::beam::covariance::CovarianceMatrix2x2::from_twiss(&twiss, 2.5);
        let estimate = TwissEstimate::from_covariance(cov.matrix(), 0).unwrap();
        assert_relative_eq!(estimate.eps_g, 2.5, max_relative = 1e-9);
        assert_relative_eq!(estimate.beta, 3.0, max_relative = 1e-9);
        assert_relative_eq!(estimate.alpha, -0.8, max_relative = 1e-9);
    }

    #[test]
    fn test_sampled_beam_round_trip() {
        let settings = BeamSettings {
            particle: ParticleSpecies::find("proton").unwrap(),
            kinetic_energy: 200.0,
            offset: 0.0,
            z_start: -15.0,
        };
        let sampler = BeamSampler::from_description(settings, Some("2:5:1.5::1:3:-0.5")).unwrap();
        let beam = *sampler.correlated().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let (mut ex, mut ey) = (TwissEstimator::new(), TwissEstimator::new());
        for sample in sampler.sample_many(&mut rng, 200_000) {
            let (x, xp) = sample.plane(Plane::X);
            let (y, yp) = sample.plane(Plane::Y);
            ex.push(x, xp);
            ey.push(y, yp);
        }

        let est_x = ex.estimate().unwrap();
        assert_relative_eq!(est_x.eps_g, beam.geometric_emittance.0, max_relative = 0.03);
        assert_relative_eq!(est_x.beta, 5.0, max_relative = 0.03);
        assert_relative_eq!(est_x.alpha, 1.5, max_relative = 0.03);

        let normalized = est_x.normalized(&beam.factors);
        assert_relative_eq!(normalized.eps_n, 2.0, max_relative = 0.03);

        let est_y = ey.estimate().unwrap();
        assert_relative_eq!(est_y.eps_g, beam.geometric_emittance.1, max_relative = 0.03);
        assert_relative_eq!(est_y.beta, 3.0, max_relative = 0.03);
        assert!((est_y.alpha + 0.5).abs() < 0.03);
    }
}
