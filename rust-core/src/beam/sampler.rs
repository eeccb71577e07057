// Beam sampler module: per-event primary kinematics
// This module draws correlated transverse phase-space coordinates and turns them into primary vertices

use log::{debug, info};
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::beam::covariance::{BeamCovariance, CovarianceMatrix2x2};
use crate::beam::particles::ParticleSpecies;
use crate::beam::twiss::{RelativisticFactors, TwissPair};
use crate::config::M_TO_MM;
use crate::interfaces::Plane;
use crate::Result;

/// One sampled point in transverse phase space
///
/// Positions in m, angles in rad.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseSpaceSample {
    pub x: f64,
    pub xp: f64,
    pub y: f64,
    pub yp: f64,
}

impl PhaseSpaceSample {
    pub fn plane(&self, plane: Plane) -> (f64, f64) {
        match plane {
            Plane::X => (self.x, self.xp),
            Plane::Y => (self.y, self.yp),
        }
    }
}

/// Primary vertex handed to the transport engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryVertex {
    /// Starting position [mm]
    pub position: Vector3<f64>,
    /// Unit momentum direction
    pub direction: Vector3<f64>,
    /// Kinetic energy [MeV]
    pub kinetic_energy: f64,
    /// PDG code of the primary
    pub pdg: i32,
    /// The phase-space sample the vertex was built from
    pub phase_space: PhaseSpaceSample,
}

/// Beam parameters that do not depend on the covariance description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSettings {
    pub particle: ParticleSpecies,
    /// Kinetic energy [MeV]
    pub kinetic_energy: f64,
    /// Horizontal offset [mm]
    pub offset: f64,
    /// Longitudinal starting position [mm]
    pub z_start: f64,
}

/// Twiss description resolved into factors, ready for sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedBeam {
    pub twiss: TwissPair,
    pub factors: RelativisticFactors,
    /// Geometric emittances [um] (x, y)
    pub geometric_emittance: (f64, f64),
    pub covariance: BeamCovariance,
}

impl CorrelatedBeam {
    /// Resolve Twiss parameters for a beam of the given kinetic energy and rest mass [MeV]
    pub fn new(twiss: TwissPair, kinetic_energy: f64, rest_mass: f64) -> Result<Self> {
        twiss.x.validate(Plane::X)?;
        twiss.y.validate(Plane::Y)?;
        let factors = RelativisticFactors::from_kinetic_energy(kinetic_energy, rest_mass)?;
        info!("gamma_rel = {}", factors.gamma);
        info!("beta_rel = {}", factors.beta);

        let eps_g_x = twiss.x.geometric_emittance(&factors);
        let eps_g_y = twiss.y.geometric_emittance(&factors);
        for (plane, t, eps_g) in [(Plane::X, twiss.x, eps_g_x), (Plane::Y, twiss.y, eps_g_y)] {
            info!(
                "Twiss {}: epsN = {} [um], epsG = {} [um], beta = {} [m], alpha = {}",
                plane.label(), t.eps_n, eps_g, t.beta, t.alpha
            );
        }

        let cov_x = CovarianceMatrix2x2::from_twiss(&twiss.x, eps_g_x);
        let cov_y = CovarianceMatrix2x2::from_twiss(&twiss.y, eps_g_y);
        debug!("Covariance matrix (X) [m^2, m rad, rad^2]: {:?}", cov_x.matrix());
        debug!("Covariance matrix (Y) [m^2, m rad, rad^2]: {:?}", cov_y.matrix());

        let covariance = BeamCovariance::new(cov_x, cov_y)?;
        debug!("Decomposed matrix (X): {:?}", covariance.x_factor.upper());
        debug!("Decomposed matrix (Y): {:?}", covariance.y_factor.upper());

        Ok(Self {
            twiss,
            factors,
            geometric_emittance: (eps_g_x, eps_g_y),
            covariance,
        })
    }
}

/// Primary generator: fixed beam or correlated Twiss beam
///
/// The sampler is immutable after construction; all randomness comes from the
/// RNG passed by the caller, so one sampler may be shared across threads that
/// each own their RNG stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSampler {
    settings: BeamSettings,
    correlated: Option<CorrelatedBeam>,
}

impl BeamSampler {
    /// Beam without spread: every primary starts at (offset, 0) heading along +z
    pub fn on_axis(settings: BeamSettings) -> Self {
        Self { settings, correlated: None }
    }

    /// Beam with Twiss covariance
    pub fn with_twiss(settings: BeamSettings, twiss: TwissPair) -> Result<Self> {
        info!("Initializing covariance matrices...");
        let correlated = CorrelatedBeam::new(twiss, settings.kinetic_energy, settings.particle.mass)?;
        Ok(Self {
            settings,
            correlated: Some(correlated),
        })
    }

    /// Build from an optional Twiss description string; empty or missing means on-axis
    pub fn from_description(settings: BeamSettings, description: Option<&str>) -> Result<Self> {
        match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => Self::with_twiss(settings, TwissPair::parse(d)?),
            None => Ok(Self::on_axis(settings)),
        }
    }

    pub fn settings(&self) -> &BeamSettings {
        &self.settings
    }

    pub fn correlated(&self) -> Option<&CorrelatedBeam> {
        self.correlated.as_ref()
    }

    pub fn has_covariance(&self) -> bool {
        self.correlated.is_some()
    }

    /// Draw one phase-space point
    ///
    /// Four independent standard normal variates are combined through the Cholesky
    /// factors; the horizontal beam offset (mm) is applied to x'.
    pub fn sample_phase_space<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpaceSample {
        match &self.correlated {
            Some(beam) => {
                let n1: f64 = rng.sample(StandardNormal);
                let n2: f64 = rng.sample(StandardNormal);
                let n3: f64 = rng.sample(StandardNormal);
                let n4: f64 = rng.sample(StandardNormal);

                let u = beam.covariance.x_factor.correlate(n1, n2);
                let v = beam.covariance.y_factor.correlate(n3, n4);
                PhaseSpaceSample {
                    x: u.x,
                    xp: u.y + self.settings.offset,
                    y: v.x,
                    yp: v.y,
                }
            }
            None => PhaseSpaceSample {
                x: self.settings.offset / M_TO_MM,
                ..PhaseSpaceSample::default()
            },
        }
    }

    /// Draw one primary vertex
    pub fn sample_vertex<R: Rng + ?Sized>(&self, rng: &mut R) -> PrimaryVertex {
        let phase_space = self.sample_phase_space(rng);
        self.vertex_from(phase_space)
    }

    /// Turn a phase-space sample into a primary vertex
    pub fn vertex_from(&self, phase_space: PhaseSpaceSample) -> PrimaryVertex {
        let direction = match self.correlated {
            Some(_) => Vector3::new(phase_space.xp, phase_space.yp, 1.0).normalize(),
            None => Vector3::z(),
        };
        PrimaryVertex {
            position: Vector3::new(
                phase_space.x * M_TO_MM,
                phase_space.y * M_TO_MM,
                self.settings.z_start,
            ),
            direction,
            kinetic_energy: self.settings.kinetic_energy,
            pdg: self.settings.particle.pdg,
            phase_space,
        }
    }

    /// Draw `count` phase-space points from a single RNG stream
    pub fn sample_many<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<PhaseSpaceSample> {
        (0..count).map(|_| self.sample_phase_space(rng)).collect()
    }

    /// Draw `count` phase-space points in parallel
    ///
    /// Each chunk owns an independent `StdRng` seeded from `seed` and the chunk index,
    /// so the result is reproducible for a fixed `seed` and `chunk_size`.
    #[cfg(feature = "parallel")]
    pub fn sample_many_parallel(&self, seed: u64, count: usize, chunk_size: usize) -> Vec<PhaseSpaceSample> {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        use rayon::prelude::*;

        let chunk_size = chunk_size.max(1);
        let chunks = count.div_ceil(chunk_size);
        (0..chunks)
            .into_par_iter()
            .flat_map_iter(|chunk| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk as u64));
                let n = chunk_size.min(count - chunk * chunk_size);
                (0..n).map(move |_| self.sample_phase_space(&mut rng)).collect::<Vec<_>>()
            })
            .collect()
    }
}
