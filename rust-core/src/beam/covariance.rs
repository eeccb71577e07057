// Covariance module: position-divergence covariance matrices and their Cholesky factors
// This module converts Twiss parameters into a 2x2 covariance matrix per plane and
// factorizes it so that independent normal draws can be correlated

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::beam::twiss::{RelativisticFactors, TwissParameters};
use crate::config::{CHOLESKY_TOLERANCE, DETERMINANT_TOLERANCE, UM_TO_M};
use crate::error::MiniScatterError;
use crate::Result;

/// Symmetric 2x2 covariance matrix of (x, x') in [m^2, m rad; m rad, rad^2]
///
/// Built as `eps_g * [[beta, -alpha], [-alpha, (1 + alpha^2) / beta]]` with the
/// geometric emittance `eps_g` converted from um to m rad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix2x2 {
    matrix: Matrix2<f64>,
    /// Geometric emittance [m rad] used to scale the matrix
    emittance: f64,
}

impl CovarianceMatrix2x2 {
    /// Build the covariance matrix from Twiss parameters and a geometric emittance [um]
    pub fn from_twiss(twiss: &TwissParameters, geometric_emittance_um: f64) -> Self {
        let emittance = geometric_emittance_um * UM_TO_M;
        let raw = Matrix2::new(
            twiss.beta, -twiss.alpha,
            -twiss.alpha, (1.0 + twiss.alpha * twiss.alpha) / twiss.beta,
        );
        Self {
            matrix: raw * emittance,
            emittance,
        }
    }

    /// Build the covariance matrix for a beam with the given relativistic factors
    pub fn for_beam(twiss: &TwissParameters, factors: &RelativisticFactors) -> Self {
        Self::from_twiss(twiss, twiss.geometric_emittance(factors))
    }

    /// Wrap an arbitrary symmetric matrix (emittance taken as sqrt(det))
    pub fn from_matrix(matrix: Matrix2<f64>) -> Self {
        let det = matrix.determinant();
        Self {
            matrix,
            emittance: if det > 0.0 { det.sqrt() } else { 0.0 },
        }
    }

    pub fn matrix(&self) -> &Matrix2<f64> {
        &self.matrix
    }

    /// Geometric emittance [m rad]
    pub fn emittance(&self) -> f64 {
        self.emittance
    }

    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Position variance <x^2>
    pub fn sigma_position_sq(&self) -> f64 {
        self.matrix[(0, 0)]
    }

    /// Divergence variance <x'^2>
    pub fn sigma_angle_sq(&self) -> f64 {
        self.matrix[(1, 1)]
    }

    /// Correlation <x x'>
    pub fn correlation(&self) -> f64 {
        self.matrix[(0, 1)]
    }

    /// Check det(C) against emittance^2 within a relative tolerance
    pub fn is_consistent_with_emittance(&self, rel_tol: f64) -> bool {
        let expected = self.emittance * self.emittance;
        (self.determinant() - expected).abs() <= rel_tol * expected.max(f64::MIN_POSITIVE)
    }

    fn is_zero(&self) -> bool {
        self.matrix.iter().all(|v| *v == 0.0)
    }
}

/// Upper triangular Cholesky factor `U` with `U^T U = C`
///
/// Computed once at setup and shared read-only by every sampled event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CholeskyFactor {
    upper: Matrix2<f64>,
}

impl CholeskyFactor {
    /// Decompose a covariance matrix
    ///
    /// A zero matrix (zero emittance) yields the zero factor. Otherwise the matrix must be
    /// symmetric and positive definite, with every pivot above `CHOLESKY_TOLERANCE`
    /// relative to its diagonal element.
    ///
    /// # Errors
    /// `MiniScatterError::Numerical` if the matrix is not positive definite within tolerance
    /// or if the reconstruction `U^T U` does not reproduce it.
    pub fn decompose(covariance: &CovarianceMatrix2x2) -> Result<Self> {
        if covariance.is_zero() {
            return Ok(Self { upper: Matrix2::zeros() });
        }

        let c = covariance.matrix();
        if c.iter().any(|v| !v.is_finite()) {
            return Err(MiniScatterError::numerical(format!(
                "Covariance matrix has non-finite entries: {:?}",
                c
            )));
        }
        let scale = c[(0, 0)].abs().max(c[(1, 1)].abs());
        if (c[(0, 1)] - c[(1, 0)]).abs() > CHOLESKY_TOLERANCE * scale {
            return Err(MiniScatterError::numerical("Covariance matrix is not symmetric"));
        }
        if c[(0, 0)] <= 0.0 || c[(1, 1)] <= 0.0 {
            return Err(MiniScatterError::numerical(format!(
                "Covariance matrix is not positive definite (diagonal {:e}, {:e}); \
                 beta must be > 0 and the emittance >= 0",
                c[(0, 0)],
                c[(1, 1)]
            )));
        }

        let cholesky = c.cholesky().ok_or_else(|| {
            MiniScatterError::numerical(format!(
                "Cholesky decomposition failed, matrix is not positive definite: {:?}",
                c
            ))
        })?;
        let upper = cholesky.l().transpose();

        // Second pivot relative to its diagonal element
        let pivot = upper[(1, 1)] * upper[(1, 1)];
        if pivot <= CHOLESKY_TOLERANCE * c[(1, 1)] {
            return Err(MiniScatterError::numerical(format!(
                "Covariance matrix is numerically degenerate (pivot {:e}, diagonal {:e})",
                pivot,
                c[(1, 1)]
            )));
        }

        let factor = Self { upper };
        let residual = (factor.reconstruct() - c).abs().max();
        if residual > CHOLESKY_TOLERANCE * scale {
            return Err(MiniScatterError::numerical(format!(
                "Cholesky reconstruction error {:e} exceeds tolerance",
                residual
            )));
        }
        if !covariance.is_consistent_with_emittance(DETERMINANT_TOLERANCE) {
            return Err(MiniScatterError::numerical(format!(
                "det(C) = {:e} does not match emittance^2 = {:e}",
                covariance.determinant(),
                covariance.emittance() * covariance.emittance()
            )));
        }

        Ok(factor)
    }

    /// The upper triangular factor U
    pub fn upper(&self) -> &Matrix2<f64> {
        &self.upper
    }

    /// U^T U, which equals the decomposed covariance matrix
    pub fn reconstruct(&self) -> Matrix2<f64> {
        self.upper.transpose() * self.upper
    }

    /// Map two independent standard normal variates onto a correlated (u, u') pair
    ///
    /// Returns `U^T n`, whose covariance is `U^T U`.
    pub fn correlate(&self, n1: f64, n2: f64) -> Vector2<f64> {
        self.upper.transpose() * Vector2::new(n1, n2)
    }
}

/// Covariance matrices and factors for both planes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamCovariance {
    pub x: CovarianceMatrix2x2,
    pub y: CovarianceMatrix2x2,
    pub x_factor: CholeskyFactor,
    pub y_factor: CholeskyFactor,
}

impl BeamCovariance {
    pub fn new(x: CovarianceMatrix2x2, y: CovarianceMatrix2x2) -> Result<Self> {
        let x_factor = CholeskyFactor::decompose(&x)?;
        let y_factor = CholeskyFactor::decompose(&y)?;
        Ok(Self { x, y, x_factor, y_factor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_covariance_matrix_entries() {
        let twiss = TwissParameters::new(1.0, 2.0, -1.0);
        let cov = CovarianceMatrix2x2::from_twiss(&twiss, 3.0);

        assert_relative_eq!(cov.sigma_position_sq(), 6e-6, epsilon = 1e-18);
        assert_relative_eq!(cov.correlation(), 3e-6, epsilon = 1e-18);
        assert_relative_eq!(cov.sigma_angle_sq(), 3e-6, epsilon = 1e-18);
        assert!(cov.is_consistent_with_emittance(1e-9));
    }

    #[test]
    fn test_correlate_uses_transpose() {
        let twiss = TwissParameters::new(2.0, 5.0, 2.0);
        let cov = CovarianceMatrix2x2::from_twiss(&twiss, 2.0);
        let factor = CholeskyFactor::decompose(&cov).unwrap();

        // With only n1 set, x' follows x through the correlation coefficient
        let v = factor.correlate(1.0, 0.0);
        assert_relative_eq!(v.x, cov.sigma_position_sq().sqrt(), max_relative = 1e-12);
        assert_relative_eq!(v.x * v.y, cov.correlation(), max_relative = 1e-12);
    }
}
