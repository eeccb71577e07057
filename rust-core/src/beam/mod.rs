// Beam module: primary-particle beam description and phase-space sampling
// This module turns a Twiss description into correlated per-event primary kinematics

// ======================== MODULE DECLARATIONS ========================
pub mod covariance;
pub mod particles;
pub mod sampler;
pub mod twiss;

mod _tests_sampler;

// ======================== TWISS DESCRIPTION ========================
pub use twiss::{
    RelativisticFactors, // struct - gamma_rel / beta_rel from energy and rest mass
    TwissPair,           // struct - Twiss parameters for the x and y planes
    TwissParameters,     // struct - (epsN, beta, alpha) of one plane
};
// TwissPair impl methods:
//   parse(description: &str) -> Result<Self>                 - parses "epsN:beta:alpha(::epsN_y:beta_y:alpha_y)"
//   symmetric(twiss: TwissParameters) -> Self                 - mirrors one plane into both
//   plane(&self, plane: Plane) -> &TwissParameters            - parameters of one plane

// RelativisticFactors impl methods:
//   from_total_energy(total: f64, mass: f64) -> Result<Self>  - fails if gamma_rel <= 1
//   from_kinetic_energy(kinetic: f64, mass: f64) -> Result<Self>
//   beta_gamma(&self) -> f64                                  - normalized / geometric emittance ratio

// ======================== COVARIANCE & DECOMPOSITION ========================
pub use covariance::{
    BeamCovariance,      // struct - matrices and factors of both planes
    CholeskyFactor,      // struct - upper triangular U with U^T U = C
    CovarianceMatrix2x2, // struct - (x, x') covariance in [m^2, m rad, rad^2]
};
// CovarianceMatrix2x2 impl methods:
//   from_twiss(twiss: &TwissParameters, eps_g_um: f64) -> Self - eps_g * [[beta, -alpha], [-alpha, gamma]]
//   for_beam(twiss: &TwissParameters, factors: &RelativisticFactors) -> Self
//   determinant(&self) -> f64                                 - equals emittance^2 by construction

// CholeskyFactor impl methods:
//   decompose(covariance: &CovarianceMatrix2x2) -> Result<Self> - NumericalError if not positive definite
//   reconstruct(&self) -> Matrix2<f64>                        - U^T U
//   correlate(&self, n1: f64, n2: f64) -> Vector2<f64>        - U^T (n1, n2)

// ======================== SAMPLING ========================
pub use sampler::{
    BeamSampler,      // struct - on-axis or correlated primary generator
    BeamSettings,     // struct - species, energy, offset, start position
    CorrelatedBeam,   // struct - resolved Twiss beam (factors, emittances, covariance)
    PhaseSpaceSample, // struct - (x, x', y, y') in m and rad
    PrimaryVertex,    // struct - position [mm], direction, energy, PDG code
};

pub use particles::ParticleSpecies; // struct - beam species (PDG code, mass, charge)
