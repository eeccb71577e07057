// Twiss estimator module: beam parameters from phase-space moments
// This is the inverse of the covariance construction: eps = sqrt(det C), beta = <x^2> / eps,
// alpha = -<x x'> / eps

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

use crate::beam::twiss::{RelativisticFactors, TwissParameters};
use crate::config::UM_TO_M;

/// Running (x, x') moments using Welford updates
///
/// Inputs in m and rad.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TwissEstimator {
    count: u64,
    mean_x: f64,
    mean_xp: f64,
    m_xx: f64,
    m_xxp: f64,
    m_xpxp: f64,
}

impl TwissEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, xp: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        let dxp = xp - self.mean_xp;
        self.mean_x += dx / n;
        self.mean_xp += dxp / n;
        self.m_xx += dx * (x - self.mean_x);
        self.m_xxp += dx * (xp - self.mean_xp);
        self.m_xpxp += dxp * (xp - self.mean_xp);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> (f64, f64) {
        (self.mean_x, self.mean_xp)
    }

    /// Population covariance, `None` with fewer than two samples
    pub fn covariance(&self) -> Option<Matrix2<f64>> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        Some(Matrix2::new(
            self.m_xx / n, self.m_xxp / n,
            self.m_xxp / n, self.m_xpxp / n,
        ))
    }

    pub fn estimate(&self) -> Option<TwissEstimate> {
        TwissEstimate::from_covariance(&self.covariance()?, self.count)
    }
}

/// Twiss parameters measured from a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwissEstimate {
    /// Geometric emittance [um]
    pub eps_g: f64,
    /// [m]
    pub beta: f64,
    pub alpha: f64,
    pub samples: u64,
}

impl TwissEstimate {
    /// Estimate from a covariance matrix in [m^2, m rad; m rad, rad^2]
    ///
    /// `None` if the matrix has no positive determinant.
    pub fn from_covariance(covariance: &Matrix2<f64>, samples: u64) -> Option<Self> {
        let det = covariance.determinant();
        if !(det > 0.0) || !(covariance[(0, 0)] > 0.0) {
            return None;
        }
        let eps = det.sqrt();
        Some(Self {
            eps_g: eps / UM_TO_M,
            beta: covariance[(0, 0)] / eps,
            alpha: -covariance[(0, 1)] / eps,
            samples,
        })
    }

    /// Normalized Twiss parameters for a beam with the given factors
    pub fn normalized(&self, factors: &RelativisticFactors) -> TwissParameters {
        TwissParameters::new(self.eps_g * factors.beta_gamma(), self.beta, self.alpha)
    }
}
